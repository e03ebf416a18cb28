//! Manual QA checklist kept on the testing-utilities page.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pending,
    Pass,
    Fail,
    Skip,
}

impl CheckStatus {
    pub const ALL: [CheckStatus; 4] = [
        CheckStatus::Pending,
        CheckStatus::Pass,
        CheckStatus::Fail,
        CheckStatus::Skip,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pending => "Pending",
            CheckStatus::Pass => "Pass",
            CheckStatus::Fail => "Fail",
            CheckStatus::Skip => "Skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub category: String,
    pub description: String,
    pub status: CheckStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
}

impl ChecklistSummary {
    /// Share of items with a verdict (pass, fail or skip), 0–100.
    pub fn completion(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.total - self.pending) * 100 / self.total) as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    /// The onboarding flows every release is walked through by hand.
    pub fn standard() -> Self {
        let entries = [
            ("templates", "Create a template with two sections and save it"),
            ("templates", "Reorder fields by drag and drop and by keyboard"),
            ("templates", "Deleting a template with submitted applications is blocked"),
            ("templates", "Upload a template together with its PDF"),
            ("wizard", "Open a prospect link and resume at the saved step"),
            ("wizard", "Required fields block Next; hidden required fields do not"),
            ("wizard", "Autosave fires after edits and after each step change"),
            ("address", "Select a suggested address and confirm the fields lock"),
            ("address", "Unlock the address and edit it manually"),
            ("ownership", "Owners must total 100%"),
            ("ownership", "Owners at or above 25% must sign"),
            ("ownership", "Request a signature by email and load it back"),
            ("submission", "Submit the application and receive confirmation"),
            ("environments", "Schema drift between development and production is empty"),
        ];
        Self {
            items: entries
                .iter()
                .enumerate()
                .map(|(idx, (category, description))| ChecklistItem {
                    id: format!("qa-{:02}", idx + 1),
                    category: category.to_string(),
                    description: description.to_string(),
                    status: CheckStatus::Pending,
                    notes: String::new(),
                })
                .collect(),
        }
    }

    pub fn set_status(&mut self, id: &str, status: CheckStatus) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    pub fn set_notes(&mut self, id: &str, notes: &str) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.notes = notes.to_string();
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.status = CheckStatus::Pending;
            item.notes.clear();
        }
    }

    /// Categories in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a ChecklistItem> {
        self.items.iter().filter(move |i| i.category == category)
    }

    pub fn summary(&self) -> ChecklistSummary {
        self.items
            .iter()
            .fold(ChecklistSummary::default(), |mut acc, item| {
                acc.total += 1;
                match item.status {
                    CheckStatus::Pass => acc.passed += 1,
                    CheckStatus::Fail => acc.failed += 1,
                    CheckStatus::Skip => acc.skipped += 1,
                    CheckStatus::Pending => acc.pending += 1,
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tracks_verdicts() {
        let mut list = Checklist::standard();
        let total = list.items.len();
        assert!(list.set_status("qa-01", CheckStatus::Pass));
        assert!(list.set_status("qa-02", CheckStatus::Fail));
        assert!(list.set_notes("qa-02", "keyboard move skips first row"));
        assert!(!list.set_status("qa-99", CheckStatus::Pass));

        let summary = list.summary();
        assert_eq!(summary.total, total);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pending, total - 2);

        list.reset();
        assert_eq!(list.summary().pending, total);
        assert!(list.items.iter().all(|i| i.notes.is_empty()));
    }

    #[test]
    fn categories_keep_first_appearance_order() {
        let list = Checklist::standard();
        assert_eq!(list.categories()[0], "templates");
        assert_eq!(list.categories().last(), Some(&"environments"));
        assert_eq!(list.in_category("address").count(), 2);
    }

    #[test]
    fn completion_percentage() {
        let summary = ChecklistSummary {
            total: 4,
            passed: 2,
            failed: 0,
            skipped: 1,
            pending: 1,
        };
        assert_eq!(summary.completion(), 75);
        assert_eq!(ChecklistSummary::default().completion(), 0);
    }
}
