//! Use-case tests for the attendance crate
//! In-memory store and a manual clock.

#[cfg(test)]
mod record_tap_tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use kernel::id::{EmployeeId, NodeId};
    use platform::clock::{Clock, ManualClock};

    use crate::application::{AttendanceConfig, RecordTapUseCase, RecordedTap, TapInput, TapOutcome};
    use crate::domain::entities::{CardOwner, NewTap, Node};
    use crate::domain::repository::TapEventStore;
    use crate::domain::value_objects::{CardUid, Direction};
    use crate::infra::memory::InMemoryAttendanceRepository;

    const CARD: &str = "04A1B2C3";

    struct Harness {
        repo: Arc<InMemoryAttendanceRepository>,
        clock: Arc<ManualClock>,
        employee_id: EmployeeId,
        node_id: NodeId,
        use_case: RecordTapUseCase<
            InMemoryAttendanceRepository,
            InMemoryAttendanceRepository,
            InMemoryAttendanceRepository,
        >,
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, s).unwrap()
    }

    fn harness() -> Harness {
        let employee_id = EmployeeId::new();
        let node_id = NodeId::new();
        let owner = CardOwner {
            employee_id,
            display_name: "Jane Doe".into(),
        };
        let repo = Arc::new(
            InMemoryAttendanceRepository::new()
                .with_card(CARD, owner.clone())
                .with_inactive_card("DEADBEEF", owner)
                .with_node(Node {
                    id: node_id,
                    name: "lobby-reader".into(),
                    location: "Lobby".into(),
                    last_heartbeat: None,
                }),
        );
        let clock = Arc::new(ManualClock::new(at(9, 0, 0)));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let use_case = RecordTapUseCase::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            dyn_clock,
            Arc::new(AttendanceConfig::default()),
        );
        Harness {
            repo,
            clock,
            employee_id,
            node_id,
            use_case,
        }
    }

    fn tap(card: &str) -> TapInput {
        TapInput {
            card_uid: CardUid::parse(card).unwrap(),
            node_id: None,
        }
    }

    async fn recorded(h: &Harness, input: TapInput) -> RecordedTap {
        match h.use_case.record_tap(input).await {
            TapOutcome::Recorded(tap) => tap,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_day_scenario() {
        let h = harness();

        let first = recorded(&h, tap(CARD)).await;
        assert_eq!(first.direction, Direction::In);
        assert_eq!(first.duration, None);
        assert_eq!(first.employee_name, "Jane Doe");
        assert_eq!(first.tapped_at, at(9, 0, 0));

        h.clock.set(at(9, 5, 0));
        let second = recorded(&h, tap(CARD)).await;
        assert_eq!(second.direction, Direction::Out);
        assert_eq!(second.duration.unwrap().to_string(), "0h 5m");

        h.clock.set(at(13, 0, 0));
        let third = recorded(&h, tap(CARD)).await;
        assert_eq!(third.direction, Direction::In);

        // Same second
        h.clock.advance(Duration::milliseconds(400));
        let fourth = recorded(&h, tap(CARD)).await;
        assert_eq!(fourth.direction, Direction::Out);
        assert_eq!(fourth.duration.unwrap().to_string(), "0h 0m");

        assert_eq!(h.repo.taps().len(), 4);
    }

    #[tokio::test]
    async fn test_alternation_restarts_each_day() {
        let h = harness();
        assert_eq!(recorded(&h, tap(CARD)).await.direction, Direction::In);

        h.clock.set(at(9, 0, 0) + Duration::days(1));
        let next_day = recorded(&h, tap(CARD)).await;
        assert_eq!(next_day.direction, Direction::In);
        assert_eq!(next_day.duration, None);
    }

    fn stored(h: &Harness, tapped_at: DateTime<Utc>, direction: Direction) -> NewTap {
        NewTap {
            employee_id: h.employee_id,
            card_uid: CARD.into(),
            tapped_at,
            direction,
            node_id: None,
            location: "Main Entrance".into(),
        }
    }

    #[tokio::test]
    async fn test_previous_day_in_is_ignored() {
        let h = harness();
        h.repo.insert_tap(stored(&h, at(8, 0, 0), Direction::In)).await.unwrap();

        h.clock.set(at(7, 0, 0) + Duration::days(1));
        let first = recorded(&h, tap(CARD)).await;
        assert_eq!(first.direction, Direction::In);
        assert_eq!(first.duration, None);
    }

    #[tokio::test]
    async fn test_duration_uses_latest_in() {
        let h = harness();
        h.repo.insert_tap(stored(&h, at(8, 0, 0), Direction::In)).await.unwrap();
        h.repo.insert_tap(stored(&h, at(9, 0, 0), Direction::Out)).await.unwrap();

        h.clock.set(at(9, 30, 0));
        assert_eq!(recorded(&h, tap(CARD)).await.direction, Direction::In);

        h.clock.set(at(10, 0, 0));
        let out = recorded(&h, tap(CARD)).await;
        assert_eq!(out.direction, Direction::Out);
        assert_eq!(out.duration.unwrap().to_string(), "0h 30m");
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_cards_write_nothing() {
        let h = harness();
        assert_eq!(
            h.use_case.record_tap(tap("FFFFFFFF")).await,
            TapOutcome::CardNotRecognized
        );
        assert_eq!(
            h.use_case.record_tap(tap("DEADBEEF")).await,
            TapOutcome::CardNotRecognized
        );
        assert!(h.repo.taps().is_empty());
    }

    #[tokio::test]
    async fn test_node_location_and_heartbeat() {
        let h = harness();
        let with_node = recorded(
            &h,
            TapInput {
                card_uid: CardUid::parse(CARD).unwrap(),
                node_id: Some(h.node_id),
            },
        )
        .await;
        assert_eq!(with_node.location, "Lobby");
        assert_eq!(h.repo.node(&h.node_id).unwrap().last_heartbeat, Some(at(9, 0, 0)));

        let unknown_node = recorded(
            &h,
            TapInput {
                card_uid: CardUid::parse(CARD).unwrap(),
                node_id: Some(NodeId::new()),
            },
        )
        .await;
        assert_eq!(unknown_node.location, "Main Entrance");

        assert_eq!(recorded(&h, tap(CARD)).await.location, "Main Entrance");
    }

    #[tokio::test]
    async fn test_store_fault_is_system_error() {
        let h = harness();
        h.repo.set_unavailable(true);
        assert!(matches!(
            h.use_case.record_tap(tap(CARD)).await,
            TapOutcome::SystemError { detail: None }
        ));
        h.repo.set_unavailable(false);
        assert!(h.repo.taps().is_empty());
    }
}

#[cfg(test)]
mod report_tests {
    use std::sync::Arc;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use kernel::id::{EmployeeId, NodeId};
    use platform::clock::{Clock, ManualClock};

    use crate::application::{
        AttendanceConfig, DailyStatsUseCase, EmployeeDayUseCase, HeartbeatOutcome, HeartbeatUseCase,
    };
    use crate::domain::entities::{NewTap, Node};
    use crate::domain::repository::TapEventStore;
    use crate::domain::value_objects::{Direction, NodeStatus};
    use crate::error::AttendanceError;
    use crate::infra::memory::InMemoryAttendanceRepository;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, m, 0).unwrap()
    }

    async fn seed(repo: &InMemoryAttendanceRepository, employee_id: EmployeeId, taps: &[(DateTime<Utc>, Direction)]) {
        for (tapped_at, direction) in taps {
            repo.insert_tap(NewTap {
                employee_id,
                card_uid: "04A1".into(),
                tapped_at: *tapped_at,
                direction: *direction,
                node_id: None,
                location: "Main Entrance".into(),
            })
            .await
            .unwrap();
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(at(3, 18, 0)))
    }

    #[tokio::test]
    async fn test_daily_stats() {
        let repo = Arc::new(InMemoryAttendanceRepository::new());
        let alice = EmployeeId::new();
        let bob = EmployeeId::new();
        seed(&repo, alice, &[(at(3, 9, 0), Direction::In), (at(3, 17, 0), Direction::Out)]).await;
        seed(&repo, bob, &[(at(3, 10, 0), Direction::In), (at(2, 10, 0), Direction::In)]).await;

        let use_case = DailyStatsUseCase::new(repo, clock(), Arc::new(AttendanceConfig::default()));

        let today = use_case.daily_stats(None).await.unwrap();
        assert_eq!(today.date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(today.stats.total_employees, 2);
        assert_eq!(today.stats.total_check_ins, 2);
        assert_eq!(today.stats.total_check_outs, 1);

        let yesterday = use_case
            .daily_stats(NaiveDate::from_ymd_opt(2024, 6, 2))
            .await
            .unwrap();
        assert_eq!(yesterday.stats.total_employees, 1);
        assert_eq!(yesterday.stats.total_check_outs, 0);
    }

    #[tokio::test]
    async fn test_employee_day_pairs_sessions() {
        let repo = Arc::new(InMemoryAttendanceRepository::new());
        let alice = EmployeeId::new();
        seed(
            &repo,
            alice,
            &[
                (at(3, 9, 0), Direction::In),
                (at(3, 12, 0), Direction::Out),
                (at(3, 13, 0), Direction::In),
            ],
        )
        .await;

        let use_case = EmployeeDayUseCase::new(repo, clock(), Arc::new(AttendanceConfig::default()));
        let day = use_case.employee_day(alice, None).await.unwrap();
        assert_eq!(day.taps.len(), 3);
        assert_eq!(day.sessions.len(), 2);
        assert_eq!(day.total.to_string(), "3h 0m");
        assert!(day.checked_in);
    }

    #[tokio::test]
    async fn test_heartbeat_and_status() {
        let node_id = NodeId::new();
        let repo = Arc::new(InMemoryAttendanceRepository::new().with_node(Node {
            id: node_id,
            name: "lobby-reader".into(),
            location: "Lobby".into(),
            last_heartbeat: Some(at(3, 17, 0)),
        }));
        let manual = Arc::new(ManualClock::new(at(3, 18, 0)));
        let use_case = HeartbeatUseCase::new(
            repo.clone(),
            manual.clone(),
            Arc::new(AttendanceConfig::default()),
        );

        let before = use_case.node_statuses().await.unwrap();
        assert_eq!(before[0].status, NodeStatus::Offline);

        assert_eq!(
            use_case.heartbeat(" lobby-reader ").await.unwrap(),
            HeartbeatOutcome::Accepted { node_id }
        );
        assert_eq!(
            use_case.heartbeat("garage-reader").await.unwrap(),
            HeartbeatOutcome::NodeNotFound
        );
        assert!(matches!(
            use_case.heartbeat("").await,
            Err(AttendanceError::NodeNameRequired)
        ));

        let after = use_case.node_statuses().await.unwrap();
        assert_eq!(after[0].status, NodeStatus::Online);
        assert_eq!(after[0].node.last_heartbeat, Some(at(3, 18, 0)));
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::{TimeZone, Utc};
    use kernel::id::EmployeeId;
    use platform::clock::{Clock, ManualClock};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::AttendanceConfig;
    use crate::domain::entities::CardOwner;
    use crate::infra::memory::InMemoryAttendanceRepository;
    use crate::presentation::handlers::AttendanceAppState;
    use crate::presentation::router::{admin_router, device_router};

    fn state() -> (AttendanceAppState<InMemoryAttendanceRepository>, EmployeeId) {
        let employee_id = EmployeeId::new();
        let repo = InMemoryAttendanceRepository::new().with_card(
            "04A1B2C3",
            CardOwner {
                employee_id,
                display_name: "Jane Doe".into(),
            },
        );
        let clock: Arc<dyn Clock> =
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()));
        (
            AttendanceAppState {
                repo: Arc::new(repo),
                clock,
                config: Arc::new(AttendanceConfig::default()),
            },
            employee_id,
        )
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_tap_endpoint() {
        let (state, employee_id) = state();
        let devices = device_router(state.clone());

        let response = devices
            .clone()
            .oneshot(post_json("/attendance/tap", r#"{"uid":"04A1B2C3"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["direction"], "IN");
        assert_eq!(body["employeeName"], "Jane Doe");
        assert_eq!(body["location"], "Main Entrance");
        assert!(body.get("duration").is_none());

        let response = devices
            .clone()
            .oneshot(post_json("/attendance/tap", r#"{"uid":"FFFF"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"], "Card not recognized");

        let response = devices
            .oneshot(post_json("/attendance/tap", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "UID is required");

        let admin = admin_router(state);
        let response = admin
            .clone()
            .oneshot(
                Request::get("/attendance/stats?date=2024-06-03")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json(response).await;
        assert_eq!(body["totalEmployees"], 1);
        assert_eq!(body["totalCheckIns"], 1);

        let response = admin
            .oneshot(
                Request::get(format!("/employees/{employee_id}/attendance"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["records"].as_array().unwrap().len(), 1);
        assert_eq!(body["checkedIn"], true);
    }

    #[tokio::test]
    async fn test_heartbeat_unknown_node() {
        let (state, _) = state();
        let response = device_router(state)
            .oneshot(post_json("/nodes/heartbeat", r#"{"name":"nowhere"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"], "Node not found");
    }

    #[tokio::test]
    async fn test_bad_date_is_rejected() {
        let (state, _) = state();
        let response = admin_router(state)
            .oneshot(
                Request::get("/attendance/stats?date=June")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
