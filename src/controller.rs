use validator::Validate;

use crate::{
    Error,
    ip::LookupRequest,
    lookup::{GeoLookup, GeoResponse},
    state::{Action, GeoRecord, Store},
};

/// Turns a search submission into a state update.
///
/// Submissions are independent: nothing is cancelled or de-duplicated, and
/// when two overlap the one that finishes last owns the state.
pub struct LookupController<L> {
    store: Store,
    client: L,
}

impl<L> LookupController<L>
where
    L: GeoLookup,
{
    pub fn new(store: Store, client: L) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn submit_current(&self) -> Result<GeoRecord, Error> {
        let input = self.store.snapshot().search_input;
        self.submit(&input).await
    }

    pub async fn submit(&self, input: &str) -> Result<GeoRecord, Error> {
        self.lookup(input).await.inspect_err(|err| {
            if let Error::Validation(_) = err {
                warn!("rejected lookup for {:?}: {}", input, err);
            } else {
                error!("Error fetching IP data for {}: {}", input, err);
            }
        })
    }

    async fn lookup(&self, input: &str) -> Result<GeoRecord, Error> {
        LookupRequest::new(input).validate()?;

        let reply = self.client.fetch(input).await?;
        if !reply.is_success() {
            return Err(Error::UpstreamStatus(reply.status));
        }

        let response = GeoResponse::parse(&reply.body)?;
        let position = response.position()?;
        let record = response.into_record(input);
        info!(
            "{} located at {} (postal code: {})",
            record.ip,
            record.location,
            record.postal_code_or_placeholder()
        );

        self.store.dispatch_all([
            Action::SetMapPosition(position),
            Action::SetGeoRecord(record.clone()),
            Action::HideDetails,
        ]);
        Ok(record)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use crate::{
        error::ErrorKind,
        lookup::LookupReply,
        state::{MapPosition, TrackerState},
    };

    use super::*;

    pub(crate) const MOUNTAIN_VIEW: &str = r#"{"latitude":37.4,"longitude":-122.1,"region_name":"California","country_name":"United States","time_zone":"America/Los_Angeles","postal_code":"94043","city":"Mountain View","ip":"8.8.8.8"}"#;

    /// Canned replies keyed by address, with an optional delay per address.
    #[derive(Default, Clone)]
    pub(crate) struct StubLookup {
        replies: HashMap<String, (u16, String)>,
        delays: HashMap<String, Duration>,
        calls: Arc<AtomicUsize>,
    }

    impl StubLookup {
        pub(crate) fn reply(mut self, ip: &str, status: u16, body: &str) -> Self {
            self.replies
                .insert(ip.to_string(), (status, body.to_string()));
            self
        }

        fn delay(mut self, ip: &str, delay: Duration) -> Self {
            self.delays.insert(ip.to_string(), delay);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GeoLookup for StubLookup {
        async fn fetch(&self, ip: &str) -> Result<LookupReply, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(ip) {
                tokio::time::sleep(*delay).await;
            }
            let (status, body) = self
                .replies
                .get(ip)
                .cloned()
                .unwrap_or((404, String::from("{}")));
            Ok(LookupReply { status, body })
        }
    }

    fn controller(stub: StubLookup) -> LookupController<StubLookup> {
        LookupController::new(Store::default(), stub)
    }

    #[tokio::test]
    async fn successful_lookup_updates_state() {
        let stub = StubLookup::default().reply("8.8.8.8", 200, MOUNTAIN_VIEW);
        let controller = controller(stub);
        controller.store().toggle_details();

        let record = controller.submit("8.8.8.8").await.unwrap();
        let state = controller.store().snapshot();

        assert_eq!(state.position, MapPosition::new(37.4, -122.1).unwrap());
        assert_eq!(state.geo_record, record);
        assert_eq!(state.geo_record.location, "California, United States");
        assert_eq!(state.geo_record.ip, "8.8.8.8");
        assert!(!state.details_visible);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_network() {
        let stub = StubLookup::default();
        let controller = controller(stub.clone());
        let before = controller.store().snapshot();

        for input in ["", "   ", "256.1.1.1", "1.1.1", "example.com", "::1"] {
            let err = controller.submit(input).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{input:?}");
        }

        assert_eq!(stub.calls(), 0);
        assert_eq!(controller.store().snapshot(), before);
    }

    #[tokio::test]
    async fn server_error_leaves_state_alone() {
        let stub = StubLookup::default().reply("8.8.8.8", 500, "oops");
        let controller = controller(stub);
        controller.store().toggle_details();
        let before = controller.store().snapshot();

        let err = controller.submit("8.8.8.8").await.unwrap_err();

        assert!(matches!(err, Error::UpstreamStatus(500)));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(controller.store().snapshot(), before);
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let stub = StubLookup::default()
            .reply("1.1.1.1", 200, "<html>")
            .reply("2.2.2.2", 200, r#"{"latitude": 123.0, "longitude": 0.0}"#);
        let controller = controller(stub);
        let before = controller.store().snapshot();

        let err = controller.submit("1.1.1.1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        let err = controller.submit("2.2.2.2").await.unwrap_err();
        assert!(matches!(err, Error::Coordinates { .. }));

        assert_eq!(controller.store().snapshot(), before);
    }

    #[tokio::test]
    async fn missing_postal_code_is_not_an_error() {
        let body = r#"{"latitude":51.5,"longitude":-0.1,"region_name":"England","country_name":"United Kingdom","time_zone":"Europe/London","city":"London","ip":"81.2.69.142"}"#;
        let stub = StubLookup::default().reply("81.2.69.142", 200, body);
        let controller = controller(stub);

        let record = controller.submit("81.2.69.142").await.unwrap();

        assert_eq!(record.postal_code, None);
        assert_eq!(record.postal_code_or_placeholder(), "Data not found");
    }

    #[tokio::test]
    async fn submit_current_uses_search_input() {
        let stub = StubLookup::default().reply("8.8.8.8", 200, MOUNTAIN_VIEW);
        let controller = controller(stub.clone());

        controller.store().set_search_input("8.8.8.8");
        controller.submit_current().await.unwrap();

        let state = controller.store().snapshot();
        assert_eq!(stub.calls(), 1);
        assert_eq!(state.search_input, "8.8.8.8");
        assert_eq!(state.geo_record.city, "Mountain View");
    }

    #[tokio::test]
    async fn later_completion_wins() {
        let slow = r#"{"latitude":10.0,"longitude":10.0,"ip":"1.1.1.1"}"#;
        let fast = r#"{"latitude":20.0,"longitude":20.0,"ip":"2.2.2.2"}"#;
        let stub = StubLookup::default()
            .reply("1.1.1.1", 200, slow)
            .reply("2.2.2.2", 200, fast)
            .delay("1.1.1.1", Duration::from_millis(80));
        let controller = controller(stub);

        let (first, second) = tokio::join!(
            controller.submit("1.1.1.1"),
            controller.submit("2.2.2.2")
        );
        first.unwrap();
        second.unwrap();

        let state: TrackerState = controller.store().snapshot();
        assert_eq!(state.geo_record.ip, "1.1.1.1");
        assert_eq!(state.position, MapPosition::new(10.0, 10.0).unwrap());
    }
}
