// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of EnergiData.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! EnergiData CLI - entry point of the `energi-data` binary

mod args;
mod output;

use anyhow::{Context, Result};
use args::{Cli, Commands, MeterDataArgs, PriceArgs, TariffArgs};
use chrono_tz::Tz;
use clap::Parser;
use energi_client::time::parse_tz;
use energi_client::{ClientConfig, Eloverblik, EnergiDataService, PriceRequest, TariffRequest};
use output::Report;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs on stderr, data on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("energi_client=info".parse()?),
        )
        .init();

    let config = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let report = run(&cli.command, &config).await?;
    if report.is_empty() {
        warn!("No data returned");
    }

    let rendered = output::render(&report, cli.format)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} rows to {}", report.rows.len(), path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

async fn run(command: &Commands, config: &ClientConfig) -> Result<Report> {
    match command {
        Commands::DayAhead(args) => {
            let client = EnergiDataService::from_config(config)?;
            let prices = client
                .day_ahead_prices(&price_request(args, config)?)
                .await
                .context("Failed to fetch day-ahead prices")?;
            Report::day_ahead(&prices)
        }
        Commands::Imbalance(args) => {
            let client = EnergiDataService::from_config(config)?;
            let prices = client
                .imbalance_prices(&price_request(args, config)?)
                .await
                .context("Failed to fetch imbalance prices")?;
            Report::imbalance(&prices)
        }
        Commands::Tariffs(args) => {
            let client = EnergiDataService::from_config(config)?;
            let table = client
                .dso_tariffs(&tariff_request(args, config)?)
                .await
                .context("Failed to fetch DSO tariffs")?;
            Report::tariffs(&table)
        }
        Commands::MeteringPoints(args) => {
            let client = Eloverblik::from_config(config)?;
            let points = client
                .metering_points(args.include_all)
                .await
                .context("Failed to fetch metering points")?;
            Report::metering_points(&points)
        }
        Commands::MeterData(args) => meter_data(args, config).await,
    }
}

fn timezone(arg: Option<&str>, config: &ClientConfig) -> Result<Tz> {
    let tz = match arg {
        Some(name) => parse_tz(name)?,
        None => config.tz()?,
    };
    Ok(tz)
}

fn price_request(args: &PriceArgs, config: &ClientConfig) -> Result<PriceRequest> {
    let mut request = PriceRequest::new(&args.start)
        .zones(args.zones.iter().map(String::as_str))
        .tz(timezone(args.tz.as_deref(), config)?);
    if let Some(end) = &args.end {
        request = request.end(end);
    }
    Ok(request)
}

fn tariff_request(args: &TariffArgs, config: &ClientConfig) -> Result<TariffRequest> {
    let mut request = TariffRequest::new(&args.start)
        .tz(timezone(args.tz.as_deref(), config)?)
        .dsos(&args.dsos)
        .tariffs(&args.tariffs);
    if let Some(end) = &args.end {
        request = request.end(end);
    }
    Ok(request)
}

async fn meter_data(args: &MeterDataArgs, config: &ClientConfig) -> Result<Report> {
    let client = Eloverblik::from_config(config)?;

    let metering_points = if args.metering_points.is_empty() {
        let ids: Vec<String> = client
            .metering_points(false)
            .await
            .context("Failed to list metering points")?
            .into_iter()
            .map(|p| p.metering_point_id)
            .collect();
        info!("Using all {} linked metering points", ids.len());
        ids
    } else {
        args.metering_points.clone()
    };

    let to = args.end().context("--from is the last representable day")?;
    let readings = client
        .time_series(&metering_points, args.from, to, args.aggregation)
        .await
        .context("Failed to fetch meter data")?;

    Report::meter_readings(&readings, config.tz()?)
}
