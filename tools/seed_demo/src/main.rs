use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use confadmin::factory;
use confadmin::models::{Conference, Speaker, Talk, Venue};

#[derive(Parser, Debug)]
#[command(name = "seed_demo")]
#[command(about = "Fill a confadmin database with random demo records")]
struct Args {
    /// Database to seed (falls back to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    #[arg(long, default_value_t = 6)]
    venues: usize,

    #[arg(long, default_value_t = 20)]
    speakers: usize,

    /// Talks per speaker, at most
    #[arg(long, default_value_t = 3)]
    talks: usize,

    #[arg(long, default_value_t = 4)]
    conferences: usize,

    /// Seed for reproducible data
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let database_url = match args.database_url.clone() {
        Some(url) => url,
        None => std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
    };
    let pool = confadmin::db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to {}", database_url);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut venues = Vec::with_capacity(args.venues);
    for _ in 0..args.venues {
        venues.push(Venue::create(&pool, &factory::venue(&mut rng)).await?);
    }
    info!("Created {} venues", venues.len());

    let mut speaker_ids = Vec::with_capacity(args.speakers);
    let mut talk_ids = Vec::new();
    for _ in 0..args.speakers {
        let speaker = Speaker::create(&pool, &factory::speaker(&mut rng), None).await?;
        for _ in 0..rng.gen_range(0..=args.talks) {
            let talk = Talk::create(&pool, &factory::talk(&mut rng, speaker.id)).await?;
            // Roughly a third of the submissions get a decision.
            match rng.gen_range(0..6) {
                0 => {
                    Talk::approve(&pool, talk.id).await?;
                }
                1 => {
                    Talk::reject(&pool, talk.id).await?;
                }
                _ => {}
            }
            talk_ids.push(talk.id);
        }
        speaker_ids.push(speaker.id);
    }
    info!("Created {} speakers with {} talks", speaker_ids.len(), talk_ids.len());

    if speaker_ids.is_empty() && args.conferences > 0 {
        anyhow::bail!("Conferences need at least one speaker; pass --speakers");
    }

    let mut conn = pool.acquire().await?;
    for _ in 0..args.conferences {
        let mut input = factory::conference(&mut rng);
        input.venue_id = venues
            .iter()
            .filter(|venue| venue.region == input.region)
            .collect::<Vec<_>>()
            .choose(&mut rng)
            .map(|venue| venue.id);
        let amount = rng.gen_range(1..=speaker_ids.len().min(5));
        input.speakers = speaker_ids.choose_multiple(&mut rng, amount).copied().collect();
        let amount = rng.gen_range(0..=talk_ids.len().min(5));
        input.talks = Some(talk_ids.choose_multiple(&mut rng, amount).copied().collect());

        let conference = Conference::create(&mut conn, &input).await?;
        info!("Created conference {} ({})", conference.name, conference.id);
    }

    info!("Done");
    Ok(())
}
