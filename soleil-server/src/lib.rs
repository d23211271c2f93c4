//! Soleil Server - 面包店取り置き预约系统后端
//!
//! # 架构概述
//!
//! 本模块是 Soleil Server 的主入口，提供以下核心功能：
//!
//! - **预约引擎** (`db::repository::reservation`): 库存原子扣减 + 生命周期状态机
//! - **积分账本** (`db::repository::point`): 追加式积分流水 + 余额投影
//! - **营业日历** (`calendar`): 覆盖日 + 定休日解析
//! - **优惠券** (`marketing`): 有效期判定 + 折扣计算
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! soleil-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (SQLite + 仓储)
//! ├── calendar/      # 营业日解析
//! ├── marketing/     # 优惠券逻辑
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod calendar;
pub mod core;
pub mod db;
pub mod marketing;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____       __     _ __
  / ___/____  / /__  (_) /
  \__ \/ __ \/ / _ \/ / /
 ___/ / /_/ / /  __/ / /
/____/\____/_/\___/_/_/
    "#
    );
}
