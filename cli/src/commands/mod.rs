mod backup;
mod calendar;
mod helpers;
mod notes;
mod plant;
mod profile;
mod tasks;

pub(crate) use backup::{cmd_export, cmd_import, cmd_reset};
pub(crate) use calendar::cmd_calendar;
pub(crate) use notes::{cmd_notes_clear, cmd_notes_set, cmd_notes_show};
pub(crate) use plant::{cmd_plant_add, cmd_plant_list, cmd_plant_show};
pub(crate) use profile::{cmd_profile_set, cmd_profile_show, cmd_theme_set, cmd_theme_show};
pub(crate) use tasks::{cmd_tasks, cmd_toggle};
