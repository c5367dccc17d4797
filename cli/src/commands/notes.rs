use anyhow::Result;

use sprout_core::service::SproutService;

pub(crate) fn cmd_notes_show(svc: &SproutService, json: bool) -> Result<()> {
    let notes = svc.notes();
    if json {
        println!("{}", serde_json::json!({ "notes": notes }));
    } else if notes.is_empty() {
        eprintln!("No notes yet. Use `sprout notes set` to write some.");
    } else {
        println!("{notes}");
    }
    Ok(())
}

pub(crate) fn cmd_notes_set(svc: &mut SproutService, text: String, json: bool) -> Result<()> {
    svc.set_notes(text)?;
    if json {
        println!("{}", serde_json::json!({ "notes": svc.notes() }));
    } else {
        println!("Notes saved ({} characters)", svc.notes().chars().count());
    }
    Ok(())
}

pub(crate) fn cmd_notes_clear(svc: &mut SproutService, json: bool) -> Result<()> {
    svc.set_notes(String::new())?;
    if json {
        println!("{}", serde_json::json!({ "notes": "" }));
    } else {
        println!("Notes cleared");
    }
    Ok(())
}
