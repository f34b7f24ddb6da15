use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use wishdeal::database::db;
use wishdeal::database::PlatformsRepository;
use wishdeal::utils::logs;
use wishdeal::{DatabaseConfig, WishdealClient};

#[derive(Parser)]
#[command(name = "wishdeal", version, about = "wishdeal 数据库管理工具")]
struct Cli {
    /// 覆盖 WISHDEAL_DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// 日志级别 (error/warn/info/debug/trace/off)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 数据库迁移
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// 写入默认平台
    Seed,
    /// 热备份数据库
    Backup {
        /// 备份目录，默认使用数据库所在目录下的 backups
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateCommand {
    /// 应用所有未执行的迁移
    Up,
    /// 回滚迁移
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// 查看迁移状态
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    logs::init_logger();

    let cli = Cli::parse();
    if let Some(level) = &cli.log_level {
        if let Err(e) = logs::set_log_level(level) {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> wishdeal::Result<()> {
    let mut config = DatabaseConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.url = url;
    }

    match cli.command {
        Commands::Migrate(cmd) => {
            let conn = db::establish_connection(&config).await?;
            match cmd {
                MigrateCommand::Up => {
                    Migrator::up(&conn, None).await?;
                    log::info!("数据库迁移完成");
                }
                MigrateCommand::Down { steps } => {
                    Migrator::down(&conn, Some(steps)).await?;
                    log::info!("已回滚 {} 个迁移", steps);
                }
                MigrateCommand::Status => {
                    for m in Migrator::get_applied_migrations(&conn).await? {
                        println!("applied  {}", m.name());
                    }
                    for m in Migrator::get_pending_migrations(&conn).await? {
                        println!("pending  {}", m.name());
                    }
                }
            }
            db::close_connection(conn).await?;
        }
        Commands::Seed => {
            let client = WishdealClient::connect(&config).await?;
            let inserted = PlatformsRepository::seed_defaults(client.db()).await?;
            println!("新增平台 {} 个", inserted);
            client.close().await?;
        }
        Commands::Backup { dir } => {
            let backup_dir = match dir {
                Some(dir) => dir,
                None => match db::sqlite_file_path(&config.url) {
                    Some(db_path) => wishdeal_path::backup_dir_for(&db_path),
                    None => {
                        return Err(wishdeal::Error::InvalidInput(
                            "内存数据库无法备份".to_string(),
                        ))
                    }
                },
            };
            let client = WishdealClient::connect(&config).await?;
            let result = client.backup(&backup_dir).await?;
            println!("{}", result.path.unwrap_or(result.message));
            client.close().await?;
        }
    }

    Ok(())
}
