fn main() -> anyhow::Result<()> {
    healthcheck_lib::run()
}
