fn main() -> anyhow::Result<()> {
    regrow::run()
}
