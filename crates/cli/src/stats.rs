use crate::view::StatRow;
use luasense_core::config::LuasenseConfig;
use tabled::{Table, settings::Style};

pub fn run(config: &LuasenseConfig) -> anyhow::Result<()> {
    let runtime = luasense_runtime::build_default_runtime(config);
    let stats = runtime.context.store().stats();

    let rows = StatRow::from_stats(&stats);
    println!("{}", Table::new(&rows).with(Style::psql()));
    Ok(())
}
