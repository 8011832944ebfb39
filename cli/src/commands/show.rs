use anyhow::Result;
use clap::Args;
use things_core::url::ShowOptions;
use things_core::url::build_show_url;

use crate::app::App;

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Item or list ID (e.g. `today`, `inbox`, or a todo UUID).
    #[arg(long)]
    id: Option<String>,

    /// Only show items with these tags (comma-separated).
    #[arg(long)]
    filter: Option<String>,

    /// Name of a project, area, tag or list to show.
    #[arg(value_name = "QUERY")]
    query: Vec<String>,
}

impl ShowCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let opts = ShowOptions {
            id: self.id.unwrap_or_default().trim().to_string(),
            filter: self.filter.unwrap_or_default(),
        };
        let url = build_show_url(&opts, &self.query.join(" "))?;
        app.open_url(&url)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::app::testing::Harness;

    #[test]
    fn show_by_id_or_query() {
        let h = Harness::new();
        h.run(&["show", "--id", "today", "--filter", "errand"]).unwrap();
        assert_eq!(h.only_url(), "things:///show?id=today&filter=errand");

        let h = Harness::new();
        h.run(&["show", "Home", "Repairs"]).unwrap();
        assert_eq!(h.only_url(), "things:///show?query=Home%20Repairs");
    }

    #[test]
    fn show_needs_a_target() {
        let h = Harness::new();
        let err = h.run(&["show"]).unwrap_err();
        assert_eq!(err.to_string(), "Must specify --id=ID or query");
    }

    #[test]
    fn dry_run_prints_instead_of_opening() {
        let h = Harness::new();
        h.run(&["show", "--id", "inbox", "--dry-run"]).unwrap();
        assert_eq!(h.out.contents(), "things:///show?id=inbox\n");
        assert!(h.urls().is_empty());
    }
}
