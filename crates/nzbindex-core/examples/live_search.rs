use nzbindex_core::{EpisodeRef, NzbIndexProvider, SceneTokens, ShowRef};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut provider = NzbIndexProvider::new()?;

    let episode = EpisodeRef {
        show: ShowRef::new("Doctor Who"),
        season: 7,
        episode: 5,
    };

    println!(
        "Searching NZBIndex for {} S{:02}E{:02}...\n",
        episode.show.name, episode.season, episode.episode
    );

    let results = provider.find_episode(&episode, &SceneTokens).await;

    println!("Found {} results:", results.len());
    for (i, result) in results.iter().enumerate() {
        let published = result
            .published
            .map(|p| p.to_rfc2822())
            .unwrap_or_else(|| "-".to_string());
        println!("  {}. {} [{}]\n     {}", i + 1, result.title, published, result.url);
    }

    println!("\nLooking for propers...\n");
    let propers = provider.find_propers(None).await;
    for proper in propers.iter().take(10) {
        println!("  • {} ({})", proper.title, proper.published);
    }

    Ok(())
}

