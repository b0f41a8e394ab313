use anyhow::Result;

fn main() -> Result<()> {
    quadstore_cli::run()
}
