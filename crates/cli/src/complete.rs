use crate::view::CompletionView;
use clap::Args;
use luasense_core::complete::RankingStrategy;
use luasense_core::config::LuasenseConfig;
use std::path::PathBuf;
use tabled::{Table, settings::Style};

#[derive(Args)]
pub struct CompleteArgs {
    /// The line being edited
    #[arg(value_name = "LINE")]
    pub line: String,

    /// Byte offset of the cursor in LINE (defaults to the end of the line)
    #[arg(long)]
    pub column: Option<usize>,

    /// Whole Lua document, used for identifiers, imports, aliases and string literals
    #[arg(long, value_name = "FILE")]
    pub buffer: Option<PathBuf>,

    /// Print the candidates as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long)]
    pub case_sensitive: bool,

    /// Show fully-qualified parameter types in method labels
    #[arg(long)]
    pub full_types: bool,

    /// Order candidates by description, then label
    #[arg(long)]
    pub legacy_ranking: bool,
}

impl CompleteArgs {
    fn apply(&self, config: &mut LuasenseConfig) {
        if self.case_sensitive {
            config.completion.case_sensitive = true;
        }
        if self.full_types {
            config.completion.full_parameter_types = true;
        }
        if self.legacy_ranking {
            config.completion.ranking = RankingStrategy::Legacy;
        }
    }

    fn cursor(&self) -> anyhow::Result<usize> {
        let column = self.column.unwrap_or(self.line.len());
        if column > self.line.len() || !self.line.is_char_boundary(column) {
            anyhow::bail!("Column {column} is not a character boundary of the line");
        }
        Ok(column)
    }
}

pub fn run(mut config: LuasenseConfig, args: CompleteArgs) -> anyhow::Result<()> {
    args.apply(&mut config);
    let column = args.cursor()?;
    let buffer = args
        .buffer
        .as_ref()
        .map(std::fs::read_to_string)
        .transpose()?;

    let runtime = luasense_runtime::build_default_runtime(&config);
    let items = runtime
        .context
        .complete(&args.line, column, buffer.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if items.is_empty() {
        println!("No completions.");
    } else {
        let views: Vec<CompletionView> = items.iter().map(CompletionView::from_item).collect();
        println!("{}", Table::new(&views).with(Style::psql()));
    }
    Ok(())
}
