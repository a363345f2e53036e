use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::net::TcpListener;

use bird_sightings::http::{create_router, AppState, SightingQueryParams, API_PREFIX};
use bird_sightings::{BirdApiClient, Catalog, ClientConfig, ClientError, NewBird, NewSighting};

/// Serve a fresh in-memory catalog on an ephemeral port and point a client at
/// it.
async fn spawn_server(seed: Option<NaiveDateTime>) -> BirdApiClient {
    let catalog = Catalog::in_memory().unwrap();
    if let Some(now) = seed {
        catalog.seed_if_empty(now).unwrap();
    }
    let app = create_router(AppState::new(Arc::new(catalog)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    BirdApiClient::new(&ClientConfig {
        api_url: format!("http://{addr}{API_PREFIX}"),
    })
    .unwrap()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn bird(name: &str, color: &str) -> NewBird {
    NewBird {
        name: name.to_string(),
        color: color.to_string(),
        weight: 0.5,
        height: 12.0,
    }
}

#[tokio::test]
async fn health_endpoint_is_reachable() {
    let client = spawn_server(None).await;
    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn seeded_server_lists_example_data() {
    let client = spawn_server(Some(at(15, 12))).await;

    let birds = client.all_birds().await.unwrap();
    let names: Vec<&str> = birds.iter().map(|bird| bird.name.as_str()).collect();
    assert_eq!(names, vec!["Eagle", "Sparrow", "Robin"]);

    let sightings = client.all_sightings().await.unwrap();
    assert_eq!(sightings.len(), 5);
    assert!(sightings
        .iter()
        .any(|s| s.location == "Grand Canyon" && s.bird.name == "Eagle"));
}

#[tokio::test]
async fn bird_and_sighting_round_trip() {
    let client = spawn_server(None).await;

    let owl = client.add_bird(&bird("Owl", "White")).await.unwrap();
    assert_eq!(client.bird(owl.id).await.unwrap(), owl);

    let updated = client
        .update_bird(owl.id, &bird("Owl", "Grey"))
        .await
        .unwrap();
    assert_eq!(updated.color, "Grey");

    let sighting = client
        .add_sighting(&NewSighting {
            bird_id: owl.id,
            location: "Barn".to_string(),
            date_time: at(2, 22),
        })
        .await
        .unwrap();
    assert_eq!(sighting.bird, updated);
    assert_eq!(client.sighting(sighting.id).await.unwrap(), sighting);

    let found = client
        .query_sightings(&SightingQueryParams {
            bird_id: Some(owl.id),
            ..SightingQueryParams::default()
        })
        .await
        .unwrap();
    assert_eq!(found, vec![sighting.clone()]);

    client.delete_sighting(sighting.id).await.unwrap();
    client.delete_bird(owl.id).await.unwrap();
    assert!(client.all_birds().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_filters_are_not_sent() {
    let client = spawn_server(None).await;
    let robin = client.add_bird(&bird("Robin", "Red")).await.unwrap();
    let jay = client.add_bird(&bird("Jay", "Blue")).await.unwrap();

    // An empty name would otherwise match nothing.
    let all = client.query_birds(Some(""), Some("Red")).await.unwrap();
    assert_eq!(all, vec![robin.clone(), jay]);

    let exact = client
        .query_birds(Some("Robin"), Some("Red"))
        .await
        .unwrap();
    assert_eq!(exact, vec![robin]);
}

#[tokio::test]
async fn whitespace_filter_is_matched_exactly() {
    let client = spawn_server(Some(at(15, 12))).await;

    let none = client.query_birds(Some(" "), None).await.unwrap();
    assert!(none.is_empty());

    let found = client
        .query_sightings(&SightingQueryParams {
            location: Some(" ".to_string()),
            ..SightingQueryParams::default()
        })
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn interval_query_over_the_wire() {
    let client = spawn_server(None).await;
    let heron = client.add_bird(&bird("Heron", "Grey")).await.unwrap();
    for (day, location) in [(1, "Lake"), (3, "Lake"), (5, "Lake"), (3, "River")] {
        client
            .add_sighting(&NewSighting {
                bird_id: heron.id,
                location: location.to_string(),
                date_time: at(day, 9),
            })
            .await
            .unwrap();
    }

    let found = client
        .query_sightings(&SightingQueryParams {
            location: Some("Lake".to_string()),
            bird_id: Some(heron.id),
            start_date: Some("2024-07-02T00:00:00".to_string()),
            end_date: Some("2024-07-05T09:00:00".to_string()),
        })
        .await
        .unwrap();
    let days: Vec<NaiveDateTime> = found.iter().map(|s| s.date_time).collect();
    assert_eq!(days, vec![at(3, 9), at(5, 9)]);
}

#[tokio::test]
async fn failures_are_classified_by_status() {
    let client = spawn_server(None).await;

    let missing = client.bird(404).await.unwrap_err();
    assert!(missing.is_not_found());

    let unknown = client
        .add_sighting(&NewSighting {
            bird_id: 12,
            location: "Nowhere".to_string(),
            date_time: at(1, 1),
        })
        .await
        .unwrap_err();
    match unknown {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert!(message.contains("12"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let eagle = client.add_bird(&bird("Eagle", "Brown")).await.unwrap();
    client
        .add_sighting(&NewSighting {
            bird_id: eagle.id,
            location: "Cliff".to_string(),
            date_time: at(1, 1),
        })
        .await
        .unwrap();
    match client.delete_bird(eagle.id).await.unwrap_err() {
        ClientError::Rejected { status, .. } => assert_eq!(status, 409),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BirdApiClient::new(&ClientConfig {
        api_url: format!("http://{addr}{API_PREFIX}"),
    })
    .unwrap();
    assert!(matches!(
        client.all_birds().await,
        Err(ClientError::Transport(_))
    ));
}
