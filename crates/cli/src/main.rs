fn main() -> anyhow::Result<()> {
    luasense_cli::run()
}
