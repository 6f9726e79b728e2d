use insee_ingestor::{
    config::{ClientCredentials, IngestorConfig},
    models::SeriesQuery,
    session::Session,
};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore]
async fn fetches_consumer_price_index_from_insee() {
    // Requires INSEE_CLIENT_ID and INSEE_CLIENT_SECRET in the environment.
    let _ = dotenvy::dotenv();
    let Ok(credentials) = ClientCredentials::from_env(None, None) else {
        println!("Skipping live INSEE test: client credentials not set.");
        return;
    };

    let mut session = Session::new(&IngestorConfig::default(), credentials)
        .expect("Failed to create session");
    let query = SeriesQuery::builder(["001759970"])
        .last_n_observations(5)
        .build()
        .unwrap();

    let table = session.fetch(&query).await;
    assert!(table.is_ok(), "fetch returned an error: {:?}", table.err());

    let table = table.unwrap();
    assert!(!table.is_empty(), "expected observations for 001759970");
    assert!(table.len() <= 5, "expected at most 5 observations");
    assert_eq!(table.columns(), ["date", "value"]);
}
