use anyhow::Result;
use scout::commands::{history, search};

use super::types::Cli;

pub fn dispatch(cli: Cli) -> Result<()> {
    let settings = cli.settings();
    let root = search::resolve_root(cli.root)?;

    if settings.show_history {
        return history::execute(&root);
    }

    let args = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    search::execute(settings, cli.terms, cli.content, &root, &args)
}
