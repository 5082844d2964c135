use anyhow::Result;

fn main() -> Result<()> {
    sandboxctl::cli::run()
}
