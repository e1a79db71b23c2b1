// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 安装 Prometheus 导出器并注册指标说明
///
/// 未启用时不安装记录器，指标宏调用为空操作
pub fn init_metrics(settings: &MetricsSettings) -> Result<()> {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr: SocketAddr = settings
        .address
        .parse()
        .with_context(|| format!("Invalid metrics address: {}", settings.address))?;

    // Address conflicts are tolerated so the API can still start.
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return Ok(());
    }

    describe_counter!("batches_submitted_total", "Total number of batches submitted");
    describe_counter!("batches_completed_total", "Total number of batches completed");
    describe_counter!(
        "records_resolved_total",
        "Total number of records resolved, labelled by verdict kind"
    );
    describe_counter!(
        "requery_submitted_total",
        "Total number of requery batches submitted"
    );
    describe_histogram!(
        "record_resolution_seconds",
        "Time spent resolving a single record in seconds"
    );

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
