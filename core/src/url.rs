//! Builders for `things:///` URL-scheme commands.
//!
//! Each builder validates its required fields and returns the full URL with
//! every value percent-encoded. Raw input follows quick-entry rules: one
//! line is the title, several lines are title plus notes.

use crate::Result;
use crate::ThingsError;
use crate::input::encode_lines;
use crate::input::split_title_notes;
use crate::input::url_encode;
use crate::when::resolve_when;

const SCHEME: &str = "things:///";

/// Ordered `key=value` pairs for one URL.
#[derive(Debug, Default)]
struct Params {
    pairs: Vec<String>,
}

impl Params {
    fn text(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.pairs.push(format!("{key}={}", url_encode(value)));
        }
    }

    fn flag(&mut self, key: &str, on: bool) {
        if on {
            self.pairs.push(format!("{key}=true"));
        }
    }

    fn lines(&mut self, key: &str, values: &[String]) {
        if !values.is_empty() {
            self.pairs.push(format!("{key}={}", encode_lines(values)));
        }
    }

    /// `id_key` wins over `title_key` when both are set.
    fn id_or_title(&mut self, id_key: &str, id: &str, title_key: &str, title: &str) {
        if !id.is_empty() {
            self.text(id_key, id);
        } else {
            self.text(title_key, title);
        }
    }

    /// Things treats `canceled` and `completed` as exclusive; canceled wins.
    fn status(&mut self, completed: bool, canceled: bool) {
        if canceled {
            self.flag("canceled", true);
        } else {
            self.flag("completed", completed);
        }
    }

    fn finish(self, verb: &str) -> String {
        if self.pairs.is_empty() {
            format!("{SCHEME}{verb}")
        } else {
            format!("{SCHEME}{verb}?{}", self.pairs.join("&"))
        }
    }
}

/// Options for `things:///add`.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub notes: String,
    pub when: String,
    pub later: bool,
    pub deadline: String,
    pub tags: String,
    pub checklist_items: Vec<String>,
    pub list: String,
    pub list_id: String,
    pub heading: String,
    pub heading_id: String,
    pub completed: bool,
    pub canceled: bool,
    pub reveal: bool,
    pub creation_date: String,
    pub completion_date: String,
    /// Several todos at once; replaces the single title from raw input.
    pub titles: Vec<String>,
}

pub fn build_add_url(opts: &AddOptions, raw_input: &str) -> String {
    let (title, notes) = split_title_notes(raw_input, &opts.notes);
    let mut params = Params::default();

    if !opts.titles.is_empty() {
        params.lines("titles", &opts.titles);
    } else {
        params.text("title", &title);
    }
    params.text("notes", &notes);
    params.text("when", &resolve_when(&opts.when, opts.later));
    params.text("deadline", &opts.deadline);
    params.text("tags", &opts.tags);
    params.lines("checklist-items", &opts.checklist_items);
    params.id_or_title("list-id", &opts.list_id, "list", &opts.list);
    params.id_or_title("heading-id", &opts.heading_id, "heading", &opts.heading);
    params.status(opts.completed, opts.canceled);
    params.flag("reveal", opts.reveal);
    params.text("creation-date", &opts.creation_date);
    params.text("completion-date", &opts.completion_date);
    if title.is_empty() && opts.titles.is_empty() {
        params.flag("show-quick-entry", true);
    }
    params.finish("add")
}

/// Options for `things:///add-project`.
#[derive(Debug, Clone, Default)]
pub struct AddProjectOptions {
    pub notes: String,
    pub when: String,
    pub deadline: String,
    pub tags: String,
    pub area: String,
    pub area_id: String,
    pub todos: Vec<String>,
    pub completed: bool,
    pub canceled: bool,
    pub reveal: bool,
    pub creation_date: String,
    pub completion_date: String,
}

pub fn build_add_project_url(opts: &AddProjectOptions, raw_input: &str) -> Result<String> {
    let (title, notes) = split_title_notes(raw_input, &opts.notes);
    if title.is_empty() {
        return Err(ThingsError::MissingTitle);
    }
    let mut params = Params::default();
    params.text("title", &title);
    params.text("notes", &notes);
    params.text("when", &opts.when);
    params.text("deadline", &opts.deadline);
    params.text("tags", &opts.tags);
    params.id_or_title("area-id", &opts.area_id, "area", &opts.area);
    params.lines("to-dos", &opts.todos);
    params.status(opts.completed, opts.canceled);
    params.flag("reveal", opts.reveal);
    params.text("creation-date", &opts.creation_date);
    params.text("completion-date", &opts.completion_date);
    Ok(params.finish("add-project"))
}

/// Options for `things:///update`.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub auth_token: String,
    pub id: String,
    pub notes: String,
    pub prepend_notes: String,
    pub append_notes: String,
    pub when: String,
    pub later: bool,
    pub deadline: String,
    pub tags: String,
    pub add_tags: String,
    pub completed: bool,
    pub canceled: bool,
    pub reveal: bool,
    pub duplicate: bool,
    pub completion_date: String,
    pub creation_date: String,
    pub heading: String,
    pub list: String,
    pub list_id: String,
    pub checklist_items: Vec<String>,
    pub prepend_checklist_items: Vec<String>,
    pub append_checklist_items: Vec<String>,
}

pub fn build_update_url(opts: &UpdateOptions, raw_input: &str) -> Result<String> {
    if opts.auth_token.is_empty() {
        return Err(ThingsError::MissingAuthToken);
    }
    if opts.id.is_empty() {
        return Err(ThingsError::MissingId);
    }
    let (title, notes) = split_title_notes(raw_input, &opts.notes);

    let mut params = Params::default();
    params.text("auth-token", &opts.auth_token);
    params.text("id", &opts.id);
    params.text("title", &title);
    params.text("notes", &notes);
    params.text("prepend-notes", &opts.prepend_notes);
    params.text("append-notes", &opts.append_notes);
    params.flag("duplicate", opts.duplicate);
    params.text("when", &resolve_when(&opts.when, opts.later));
    params.text("deadline", &opts.deadline);
    params.text("tags", &opts.tags);
    params.text("add-tags", &opts.add_tags);
    params.lines("checklist-items", &opts.checklist_items);
    params.lines("prepend-checklist-items", &opts.prepend_checklist_items);
    params.lines("append-checklist-items", &opts.append_checklist_items);
    params.id_or_title("list-id", &opts.list_id, "list", &opts.list);
    params.text("heading", &opts.heading);
    params.status(opts.completed, opts.canceled);
    params.flag("reveal", opts.reveal);
    params.text("creation-date", &opts.creation_date);
    params.text("completion-date", &opts.completion_date);
    Ok(params.finish("update"))
}

/// Options for `things:///update-project`.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectOptions {
    pub auth_token: String,
    pub id: String,
    pub notes: String,
    pub prepend_notes: String,
    pub append_notes: String,
    pub when: String,
    pub deadline: String,
    pub tags: String,
    pub add_tags: String,
    pub area_id: String,
    pub area: String,
    pub completed: bool,
    pub canceled: bool,
    pub reveal: bool,
    pub duplicate: bool,
    pub completion_date: String,
    pub creation_date: String,
    pub todos: Vec<String>,
}

pub fn build_update_project_url(opts: &UpdateProjectOptions, raw_input: &str) -> Result<String> {
    if opts.auth_token.is_empty() {
        return Err(ThingsError::MissingAuthToken);
    }
    if opts.id.is_empty() {
        return Err(ThingsError::MissingId);
    }
    let (title, notes) = split_title_notes(raw_input, &opts.notes);

    let mut params = Params::default();
    params.text("auth-token", &opts.auth_token);
    params.text("id", &opts.id);
    params.text("title", &title);
    params.text("prepend-notes", &opts.prepend_notes);
    params.text("append-notes", &opts.append_notes);
    params.flag("duplicate", opts.duplicate);
    params.text("when", &opts.when);
    params.text("deadline", &opts.deadline);
    params.lines("to-dos", &opts.todos);
    params.flag("reveal", opts.reveal);
    params.text("tags", &opts.tags);
    params.text("add-tags", &opts.add_tags);
    params.text("notes", &notes);
    params.text("creation-date", &opts.creation_date);
    params.text("completion-date", &opts.completion_date);
    params.status(opts.completed, opts.canceled);
    params.id_or_title("area-id", &opts.area_id, "area", &opts.area);
    Ok(params.finish("update-project"))
}

/// Options for `things:///show`.
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    pub id: String,
    /// Comma-separated tags to filter the shown list by.
    pub filter: String,
}

pub fn build_show_url(opts: &ShowOptions, query: &str) -> Result<String> {
    let query = query.trim();
    let mut params = Params::default();
    if !opts.id.is_empty() {
        params.text("id", &opts.id);
    } else if !query.is_empty() {
        params.text("query", query);
    } else {
        return Err(ThingsError::MissingShowTarget);
    }
    params.text("filter", &opts.filter);
    Ok(params.finish("show"))
}

pub fn build_search_url(query: &str) -> String {
    let mut params = Params::default();
    params.text("query", query.trim());
    params.finish("search")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_with_title_only() {
        let url = build_add_url(&AddOptions::default(), "New Todo");
        assert_eq!(url, "things:///add?title=New%20Todo");
    }

    #[test]
    fn add_without_title_shows_quick_entry() {
        let url = build_add_url(&AddOptions::default(), "");
        assert_eq!(url, "things:///add?show-quick-entry=true");
    }

    #[test]
    fn add_splits_multiline_input() {
        let url = build_add_url(&AddOptions::default(), "Title\n\nNotes");
        assert_eq!(url, "things:///add?title=Title&notes=Notes");
    }

    #[test]
    fn add_prefers_list_id_and_canceled() {
        let opts = AddOptions {
            list: "Errands".to_string(),
            list_id: "L1".to_string(),
            completed: true,
            canceled: true,
            checklist_items: vec!["eggs".to_string(), "oat milk".to_string()],
            later: true,
            ..Default::default()
        };
        let url = build_add_url(&opts, "Shop");
        assert_eq!(
            url,
            "things:///add?title=Shop&when=evening&checklist-items=eggs%0Aoat%20milk&list-id=L1&canceled=true"
        );
    }

    #[test]
    fn add_multiple_titles() {
        let opts = AddOptions {
            titles: vec!["one".to_string(), "two".to_string()],
            ..Default::default()
        };
        assert_eq!(build_add_url(&opts, ""), "things:///add?titles=one%0Atwo");
    }

    #[test]
    fn add_project_requires_title() {
        assert!(matches!(
            build_add_project_url(&AddProjectOptions::default(), "  "),
            Err(ThingsError::MissingTitle)
        ));
        let opts = AddProjectOptions {
            area: "Work".to_string(),
            todos: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        assert_eq!(
            build_add_project_url(&opts, "Launch").unwrap(),
            "things:///add-project?title=Launch&area=Work&to-dos=a%0Ab"
        );
    }

    #[test]
    fn update_requires_token_then_id() {
        let mut opts = UpdateOptions::default();
        assert!(matches!(
            build_update_url(&opts, ""),
            Err(ThingsError::MissingAuthToken)
        ));
        opts.auth_token = "secret".to_string();
        assert!(matches!(build_update_url(&opts, ""), Err(ThingsError::MissingId)));
        opts.id = "ABC".to_string();
        opts.add_tags = "home, errands".to_string();
        assert_eq!(
            build_update_url(&opts, "").unwrap(),
            "things:///update?auth-token=secret&id=ABC&add-tags=home%2C%20errands"
        );
    }

    #[test]
    fn update_project_orders_status_and_area() {
        let opts = UpdateProjectOptions {
            auth_token: "t".to_string(),
            id: "P1".to_string(),
            completed: true,
            area_id: "A1".to_string(),
            area: "ignored".to_string(),
            ..Default::default()
        };
        assert_eq!(
            build_update_project_url(&opts, "").unwrap(),
            "things:///update-project?auth-token=t&id=P1&completed=true&area-id=A1"
        );
    }

    #[test]
    fn show_needs_id_or_query() {
        assert!(matches!(
            build_show_url(&ShowOptions::default(), ""),
            Err(ThingsError::MissingShowTarget)
        ));
        let opts = ShowOptions {
            filter: "work".to_string(),
            ..Default::default()
        };
        assert_eq!(
            build_show_url(&opts, "today").unwrap(),
            "things:///show?query=today&filter=work"
        );
    }

    #[test]
    fn search_without_query_opens_search() {
        assert_eq!(build_search_url(""), "things:///search");
        assert_eq!(build_search_url("milk"), "things:///search?query=milk");
    }
}
