//! Runs client calls off the render thread.
//!
//! Each request is spawned on the tokio runtime and its result comes back as
//! an [`Outcome`] over a channel. The draw loop drains the channel every tick,
//! so the UI state is only ever touched from one thread.

use std::fmt;
use std::future::Future;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, warn};
use tokio::runtime::Handle;

use crate::client::{BirdApiClient, ClientError, ClientResult};
use crate::dto::{BirdDto, SightingDto};
use crate::http::SightingQueryParams;
use crate::models::{NewBird, NewSighting};
use crate::query::BirdQuery;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    LoadBirds,
    LoadSightings,
    AddBird,
    UpdateBird,
    DeleteBird,
    AddSighting,
    DeleteSighting,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::LoadBirds => "Loading birds",
            Action::LoadSightings => "Loading sightings",
            Action::AddBird => "Adding bird",
            Action::UpdateBird => "Updating bird",
            Action::DeleteBird => "Deleting bird",
            Action::AddSighting => "Adding sighting",
            Action::DeleteSighting => "Deleting sighting",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub(crate) enum Outcome {
    BirdsLoaded(Vec<BirdDto>),
    SightingsLoaded {
        bird_id: i64,
        sightings: Vec<SightingDto>,
    },
    BirdAdded(BirdDto),
    BirdUpdated(BirdDto),
    BirdDeleted(i64),
    SightingAdded(SightingDto),
    SightingDeleted {
        id: i64,
        bird_id: i64,
    },
    Failed {
        action: Action,
        error: ClientError,
    },
}

pub(crate) struct Worker {
    runtime: Handle,
    client: BirdApiClient,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
    in_flight: usize,
}

impl Worker {
    pub(crate) fn new(client: BirdApiClient, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            runtime,
            client,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Everything that finished since the last call.
    pub(crate) fn drain(&mut self) -> Vec<Outcome> {
        let outcomes: Vec<Outcome> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    fn spawn<F, Fut>(&mut self, action: Action, job: F)
    where
        F: FnOnce(BirdApiClient) -> Fut,
        Fut: Future<Output = ClientResult<Outcome>> + Send + 'static,
    {
        let tx = self.tx.clone();
        let request = job(self.client.clone());
        self.in_flight += 1;
        debug!("{action} ({} in flight)", self.in_flight);

        self.runtime.spawn(async move {
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!("{action} failed: {error}");
                    Outcome::Failed { action, error }
                }
            };
            if tx.send(outcome).is_err() {
                debug!("UI closed before {action} finished");
            }
        });
    }

    /// An empty filter lists every bird; otherwise the query endpoint decides.
    pub(crate) fn load_birds(&mut self, filter: &BirdQuery) {
        let filter = filter.clone();
        self.spawn(Action::LoadBirds, move |client| async move {
            let birds = if filter == BirdQuery::default() {
                client.all_birds().await?
            } else {
                client
                    .query_birds(filter.name.as_deref(), filter.color.as_deref())
                    .await?
            };
            Ok::<_, ClientError>(Outcome::BirdsLoaded(birds))
        });
    }

    pub(crate) fn load_sightings(&mut self, bird_id: i64) {
        self.spawn(Action::LoadSightings, move |client| async move {
            let params = SightingQueryParams {
                bird_id: Some(bird_id),
                ..SightingQueryParams::default()
            };
            let sightings = client.query_sightings(&params).await?;
            Ok::<_, ClientError>(Outcome::SightingsLoaded { bird_id, sightings })
        });
    }

    pub(crate) fn add_bird(&mut self, bird: NewBird) {
        self.spawn(Action::AddBird, move |client| async move {
            client.add_bird(&bird).await.map(Outcome::BirdAdded)
        });
    }

    pub(crate) fn update_bird(&mut self, id: i64, bird: NewBird) {
        self.spawn(Action::UpdateBird, move |client| async move {
            client.update_bird(id, &bird).await.map(Outcome::BirdUpdated)
        });
    }

    pub(crate) fn delete_bird(&mut self, id: i64) {
        self.spawn(Action::DeleteBird, move |client| async move {
            client.delete_bird(id).await?;
            Ok::<_, ClientError>(Outcome::BirdDeleted(id))
        });
    }

    pub(crate) fn add_sighting(&mut self, sighting: NewSighting) {
        self.spawn(Action::AddSighting, move |client| async move {
            client
                .add_sighting(&sighting)
                .await
                .map(Outcome::SightingAdded)
        });
    }

    pub(crate) fn delete_sighting(&mut self, id: i64, bird_id: i64) {
        self.spawn(Action::DeleteSighting, move |client| async move {
            client.delete_sighting(id).await?;
            Ok::<_, ClientError>(Outcome::SightingDeleted { id, bird_id })
        });
    }
}
