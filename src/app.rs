//! 应用入口
//!
//! 配置 → 课程代码发现 → 并行抓取 → 写 CSV

use crate::browser::ChromeLauncher;
use crate::config::Config;
use crate::infrastructure::SessionFactory;
use crate::orchestrator::Orchestrator;
use crate::services::{CodeDiscovery, CsvSink, SinkOutcome};
use crate::utils::logging::{log_codes_discovered, log_startup, print_final_stats};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

/// 应用主结构
pub struct App<F: SessionFactory = ChromeLauncher> {
    config: Arc<Config>,
    factory: Arc<F>,
}

impl App<ChromeLauncher> {
    /// 使用无头 Chrome 初始化应用
    pub fn initialize(config: Config) -> Self {
        let factory = ChromeLauncher::new(config.browser.clone());
        Self::with_factory(config, factory)
    }
}

impl<F: SessionFactory> App<F> {
    pub fn with_factory(config: Config, factory: F) -> Self {
        Self {
            config: Arc::new(config),
            factory: Arc::new(factory),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑
    ///
    /// 只有课程代码发现失败（或写文件失败）才返回错误；
    /// 没有课程代码或没有抓到任何记录时返回 `SinkOutcome::NoData`。
    /// 无论结果如何，最后都会释放会话工厂的资源。
    pub async fn run(&self) -> Result<SinkOutcome> {
        let outcome = self.scrape().await;
        self.factory.shutdown().await;
        outcome
    }

    async fn scrape(&self) -> Result<SinkOutcome> {
        log_startup(&self.config);

        let codes = CodeDiscovery::new(&self.config)
            .discover(self.factory.as_ref())
            .await
            .context("无法获取课程代码列表")?;

        if codes.is_empty() {
            warn!("⚠️ 没有找到任何课程代码，程序结束");
            print_final_stats(0, 0, 0, None);
            return Ok(SinkOutcome::NoData);
        }
        log_codes_discovered(codes.len());

        let orchestrator = Orchestrator::new(Arc::clone(&self.factory), Arc::clone(&self.config));
        let (results, stats) = orchestrator
            .run_with_stats(&codes, self.config.worker_count)
            .await;

        let sink = CsvSink::new(&self.config.output_path);
        let outcome = sink.write(&results).await?;

        match &outcome {
            SinkOutcome::Written { path, rows } => {
                let path = path.display().to_string();
                print_final_stats(*rows, stats.succeeded, stats.failed, Some(&path));
            }
            SinkOutcome::NoData => print_final_stats(0, stats.succeeded, stats.failed, None),
        }

        Ok(outcome)
    }
}
