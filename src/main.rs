// ==========================================
// 发票催收汇总系统 - 命令行主入口
// ==========================================
// 退出码: 0 成功; 非 0 仅限加载/导出/配置失败
// ==========================================

use clap::Parser;
use recobro_facturas::cli::{Cli, Command};
use recobro_facturas::{commands, logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    logging::init_with(&cli.log_options())?;

    tracing::info!(
        app = recobro_facturas::APP_NAME,
        version = recobro_facturas::VERSION,
        "启动"
    );

    match &cli.command {
        Command::Process(args) => {
            let summary = commands::run_process(args)?;
            print!("{}", commands::format_summary(&summary));
        }
        Command::Normalize(args) => {
            println!("{}", commands::run_normalize(args));
        }
    }

    Ok(())
}
