use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use fleet::app::{run_until_shutdown, Application};
use fleet::shutdown::ShutdownManager;
use fleet_core::config::AppConfig;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG_PATH: &str = "config/fleet.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config_path = matches.get_one::<String>("config");
    let config = load_config(config_path.map(String::as_str))?;

    // 命令行参数优先于配置文件
    let log_level = arg_or(&matches, "log-level", &config.observability.log_level);
    let log_format = arg_or(&matches, "log-format", &config.observability.log_format);
    init_logging(&log_level, &log_format)?;

    info!("启动配送机器人分配服务");

    let app = Arc::new(Application::new(config).await?);
    let shutdown_manager = ShutdownManager::new();

    let result = run_until_shutdown(
        app,
        &shutdown_manager,
        wait_for_shutdown_signal(),
        Duration::from_secs(30),
    )
    .await;

    match &result {
        Ok(()) => info!("配送机器人分配服务已退出"),
        Err(e) => error!("应用运行失败: {e:#}"),
    }
    result
}

fn cli() -> Command {
    Command::new("fleet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("配送机器人匹配与分配服务")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径 (默认 config/fleet.toml，不存在时使用内置默认值)"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty"]),
        )
}

/// 显式指定的配置文件必须存在；未指定时回退到默认路径与内置默认值
fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => {
            AppConfig::load(Some(path)).with_context(|| format!("加载配置文件失败: {path}"))
        }
        None => AppConfig::load(None)
            .with_context(|| format!("加载配置失败 (默认路径: {DEFAULT_CONFIG_PATH})")),
    }
}

fn arg_or(matches: &ArgMatches, name: &str, fallback: &str) -> String {
    matches
        .get_one::<String>(name)
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

/// 初始化日志系统
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
