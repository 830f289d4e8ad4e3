use clap::Parser;
use storm_player::utils::logger;
use storm_player::{
    CliConfig, ConditionEvaluator, CpalPlayer, OpenMeteoSource, PlaybackDispatcher, RunOutcome, RunSettings,
    StormEngine, StormError, Trigger,
};

fn fail(e: &StormError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🌧️ Starting storm-player");
    tracing::debug!("CLI config: {:?}", cli);

    // 載入並驗證配置
    let settings = match cli
        .load_file_config()
        .and_then(|file| RunSettings::resolve(&cli, file))
    {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            fail(&e);
        }
    };

    let source = match OpenMeteoSource::new(&settings.weather) {
        Ok(source) => source,
        Err(e) => fail(&e),
    };

    let engine = StormEngine::new(
        ConditionEvaluator::new(source, settings.location.clone()),
        PlaybackDispatcher::new(CpalPlayer::new(settings.volume)),
    );

    match engine.run(&settings.invocation).await {
        Ok(RunOutcome::Skipped { reading }) => {
            println!("☀️ Not raining in {}, nothing played", reading.location);
        }
        Ok(RunOutcome::Played { trigger, exported }) => {
            match trigger {
                Trigger::Override => println!("✅ Played {}", settings.invocation.audio.display()),
                Trigger::Weather(reading) => println!(
                    "✅ Raining in {} ({:.2} mm), played {}",
                    reading.location,
                    reading.rain_mm.max(reading.precipitation_mm),
                    settings.invocation.audio.display()
                ),
            }
            if let Some(path) = exported {
                println!("📁 WAV copy saved to: {}", path.display());
            }
        }
        Ok(RunOutcome::DryRun { would_play, .. }) => {
            println!("🔍 Dry run: would play = {}", would_play);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
