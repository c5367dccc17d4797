use anyhow::{Result, bail};
use serde::Serialize;

use sprout_core::models::{Appearance, Palette, PaletteColors, Theme, UserProfile};
use sprout_core::service::SproutService;

pub(crate) fn cmd_profile_show(svc: &SproutService, json: bool) -> Result<()> {
    print_profile(svc.profile(), json)
}

pub(crate) fn cmd_profile_set(
    svc: &mut SproutService,
    name: Option<String>,
    email: Option<String>,
    age: Option<String>,
    json: bool,
) -> Result<()> {
    if name.is_none() && email.is_none() && age.is_none() {
        bail!("Nothing to update. Pass --name, --email or --age");
    }

    let mut profile = svc.profile().clone();
    if let Some(name) = name {
        profile.name = name;
    }
    if let Some(email) = email {
        profile.email = email;
    }
    if let Some(age) = age {
        profile.age = age;
    }
    svc.set_profile(profile)?;

    print_profile(svc.profile(), json)
}

fn print_profile(profile: &UserProfile, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    println!("Name:   {}", or_dash(&profile.name));
    println!("Email:  {}", or_dash(&profile.email));
    println!("Age:    {}", or_dash(&profile.age));
    Ok(())
}

pub(crate) fn cmd_theme_show(svc: &SproutService, json: bool) -> Result<()> {
    print_appearance(svc.appearance(), json)
}

pub(crate) fn cmd_theme_set(
    svc: &mut SproutService,
    mode: Option<&str>,
    palette: Option<&str>,
    json: bool,
) -> Result<()> {
    if mode.is_none() && palette.is_none() {
        bail!("Nothing to update. Pass --mode and/or --palette");
    }

    let mut appearance = svc.appearance();
    if let Some(mode) = mode {
        appearance.theme = mode.parse::<Theme>()?;
    }
    if let Some(palette) = palette {
        appearance.palette = palette.parse::<Palette>()?;
    }
    svc.set_appearance(appearance)?;

    print_appearance(svc.appearance(), json)
}

fn print_appearance(appearance: Appearance, json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct AppearanceView {
        theme: Theme,
        palette: Palette,
        colors: PaletteColors,
    }

    let colors = appearance.palette.colors();
    if json {
        let view = AppearanceView {
            theme: appearance.theme,
            palette: appearance.palette,
            colors,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("Theme:    {}", appearance.theme.as_str());
        println!(
            "Palette:  {} (main {}, light {}, dark {})",
            appearance.palette.as_str(),
            colors.main,
            colors.light,
            colors.dark
        );
    }
    Ok(())
}
