/// Smoke-test for the Guru adapter against the live site.
///
/// Logs in with `GURU_USERNAME` / `GURU_PASSWORD` (answering the security
/// question from `GURU_SECURITY_ANSWERS` if asked), lists the job board with
/// every category on it selected, and prints the first job's detail.
///
/// Run with:
///   cargo run -p jobwatch-client --example guru_smoke --features browser
use jobwatch_client::{ChromiumDriver, GuruAdapter, GuruCredentials};
use jobwatch_core::filters::FilterSet;
use jobwatch_core::models::Category;
use jobwatch_core::platform::Platform;
use jobwatch_core::traits::SourceAdapter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let adapter = GuruAdapter::new(ChromiumDriver::launch().await?, GuruCredentials::from_env()?);

    println!("Logging in…");
    let mut session = adapter.open_session().await?;

    let result = async {
        let categories = adapter.fetch_categories(&mut session).await?;
        println!("{} categories on the job board", categories.len());

        let selected = categories
            .into_iter()
            .map(|c| Category {
                platform: Platform::Guru,
                name: c.name,
                external_key: c.external_key,
                selected: true,
            })
            .collect();
        let filter = FilterSet::new(Platform::Guru, selected, vec![]);

        let jobs = adapter.list_visible_jobs(&mut session, &filter).await?;
        println!("{} jobs visible", jobs.len());

        if let Some(first) = jobs.first() {
            let detail = adapter.fetch_job_detail(&mut session, first).await?;
            println!("{}\n{}\n{}", detail.title, detail.budget.summary(), detail.url);
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    adapter.close_session(session).await?;
    result
}
