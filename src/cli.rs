use crate::config::Config;
use crate::orchestrator::{print_distribution, App};
use crate::services::{DistributionInput, ExportKind};
use crate::utils::logging;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "guard-schedule")]
#[command(about = "考试监考排班客户端：提交任务、跟踪进度、显示并导出排班表")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// 排班服务器地址（覆盖 SCHEDULER_BASE_URL）
    #[arg(long)]
    pub base_url: Option<String>,

    /// 导出文件目录（覆盖 OUTPUT_DIR）
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// 未设置 RUST_LOG 时输出 debug 级别日志
    #[arg(long, short)]
    pub verbose: bool,

    /// 先保存设置并等待完成，再提交任务
    #[arg(long)]
    pub sequenced_settings_save: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 提交排班任务并跟踪到结束
    Generate {
        /// 设置文件（JSON 或 TOML），默认 SETTINGS_FILE
        #[arg(long)]
        settings: Option<PathBuf>,
        /// 成功后导出的文件类型
        #[arg(long, value_enum)]
        export: Vec<ExportKind>,
        /// 把排班结果另存为 JSON，供之后导出
        #[arg(long)]
        save_schedule: Option<PathBuf>,
    },
    /// 公平分配计算器
    Distribute {
        /// 教师人数
        #[arg(long)]
        workers: u32,
        #[arg(long, default_value_t = 0)]
        large: u32,
        #[arg(long, default_value_t = 0)]
        other: u32,
        #[arg(long, default_value_t = 3.0)]
        weight: f64,
    },
    /// 根据设置和实体目录推算计算器输入
    Autofill {
        #[arg(long)]
        settings: Option<PathBuf>,
        /// 离线实体目录 JSON；省略时从服务器获取
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// 读取或保存服务器上的设置
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// 导出之前保存的排班结果
    Export {
        #[arg(long)]
        schedule: PathBuf,
        #[arg(long, value_enum, required = true)]
        kind: Vec<ExportKind>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// 把服务器上的设置写入文件
    Pull {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// 把设置文件保存到服务器
    Push {
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}

fn resolve_config(args: &Args) -> Config {
    let mut config = Config::from_env();
    if let Some(url) = &args.base_url {
        config.scheduler_base_url = url.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.display().to_string();
    }
    config.verbose_logging |= args.verbose;
    config.sequenced_settings_save |= args.sequenced_settings_save;
    config
}

pub async fn dispatch(args: Args) -> Result<()> {
    let config = resolve_config(&args);
    logging::init(config.verbose_logging);
    let default_settings = PathBuf::from(&config.settings_file);

    match args.cmd {
        Command::Distribute {
            workers,
            large,
            other,
            weight,
        } => print_distribution(&DistributionInput {
            total_workers: workers,
            large_units: large,
            other_units: other,
            large_weight: weight,
        }),
        Command::Generate {
            settings,
            export,
            save_schedule,
        } => {
            let settings = settings.unwrap_or(default_settings);
            let mut app = App::initialize(config).await?;
            app.generate(&settings, &export, save_schedule.as_deref())
                .await
        }
        Command::Autofill {
            settings,
            catalog,
            weight,
        } => {
            let settings = settings.unwrap_or(default_settings);
            let app = App::initialize(config).await?;
            app.autofill(&settings, catalog.as_deref(), weight).await
        }
        Command::Settings { action } => {
            let app = App::initialize(config).await?;
            match action {
                SettingsAction::Pull { out } => {
                    app.pull_settings(&out.unwrap_or(default_settings)).await
                }
                SettingsAction::Push { settings } => {
                    app.push_settings(&settings.unwrap_or(default_settings))
                        .await
                }
            }
        }
        Command::Export { schedule, kind } => {
            let app = App::initialize(config).await?;
            app.export_saved(&schedule, &kind).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_with_exports() {
        let args = Args::try_parse_from([
            "guard-schedule",
            "--base-url",
            "http://10.0.0.5:5000",
            "generate",
            "--settings",
            "s.toml",
            "--export",
            "exams-sheet",
            "--export",
            "anonymous-document",
        ])
        .unwrap();

        let config = resolve_config(&args);
        assert_eq!(config.scheduler_base_url, "http://10.0.0.5:5000");
        match args.cmd {
            Command::Generate { export, .. } => assert_eq!(
                export,
                vec![ExportKind::ExamsSheet, ExportKind::AnonymousDocument]
            ),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_distribute_defaults() {
        let args = Args::try_parse_from(["guard-schedule", "distribute", "--workers", "3"]).unwrap();
        match args.cmd {
            Command::Distribute { large, other, weight, .. } => {
                assert_eq!((large, other), (0, 0));
                assert_eq!(weight, 3.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
