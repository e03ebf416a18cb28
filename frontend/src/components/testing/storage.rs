//! Keeps the QA checklist in `localStorage` between visits.

use common::checklist::Checklist;

const CHECKLIST_KEY: &str = "merchant-onboarding.qa-checklist";

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Lays saved verdicts over the standard list, so items added to the
/// standard list later still show up and removed ones disappear.
pub fn merge_saved(mut standard: Checklist, saved: &Checklist) -> Checklist {
    for item in &mut standard.items {
        if let Some(previous) = saved.items.iter().find(|s| s.id == item.id) {
            item.status = previous.status;
            item.notes = previous.notes.clone();
        }
    }
    standard
}

pub fn load_checklist() -> Checklist {
    let saved = storage()
        .and_then(|s| s.get_item(CHECKLIST_KEY).ok().flatten())
        .and_then(|raw| serde_json::from_str::<Checklist>(&raw).ok());
    match saved {
        Some(saved) => merge_saved(Checklist::standard(), &saved),
        None => Checklist::standard(),
    }
}

pub fn store_checklist(checklist: &Checklist) {
    let Some(storage) = storage() else {
        return;
    };
    match serde_json::to_string(checklist) {
        Ok(raw) => {
            if storage.set_item(CHECKLIST_KEY, &raw).is_err() {
                gloo_console::warn!("could not persist the QA checklist");
            }
        }
        Err(err) => gloo_console::error!(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::checklist::CheckStatus;

    #[test]
    fn saved_verdicts_survive_and_unknown_items_drop() {
        let mut saved = Checklist::standard();
        saved.set_status("qa-03", CheckStatus::Fail);
        saved.set_notes("qa-03", "delete went through");
        saved.items[0].id = "qa-retired".to_string();

        let merged = merge_saved(Checklist::standard(), &saved);
        assert_eq!(merged.items.len(), Checklist::standard().items.len());
        assert_eq!(merged.items[2].status, CheckStatus::Fail);
        assert_eq!(merged.items[2].notes, "delete went through");
        assert_eq!(merged.items[0].status, CheckStatus::Pending);
        assert!(merged.items.iter().all(|i| i.id != "qa-retired"));
    }
}
