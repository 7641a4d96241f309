use color_eyre::Result;

fn main() -> Result<()> {
    tweesplit::run::run()
}
