fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = sales_dashboard::args::parse();
    sales_dashboard::cli::main(args)
}
