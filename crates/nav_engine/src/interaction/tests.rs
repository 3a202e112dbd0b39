    use std::time::{Duration, Instant};

    use super::*;
    use crate::geometry::Position;
    use crate::input::{Direction, InputEvent};
    use crate::zones::{
        Role, ZoneAction, ZoneEffect, ZoneRegistry, CREATE_DRUG_ZONE_ID, LOGOUT_ZONE_ID,
        PHARMACY_ZONE_ID, PROFILE_ZONE_ID,
    };
    use crate::EngineConfig;

    const KEY_REPEAT: Duration = Duration::from_millis(10);
    const WINDOW: Duration = Duration::from_millis(100);

    #[derive(Debug, Default)]
    struct RecordingHandler {
        navigations: Vec<String>,
        actions: Vec<ZoneAction>,
    }

    impl ZoneHandler for RecordingHandler {
        fn navigate(&mut self, path: &str) {
            self.navigations.push(path.to_string());
        }

        fn invoke(&mut self, action: ZoneAction) {
            self.actions.push(action);
        }
    }

    struct Harness {
        bus: InputBus,
        engine: InteractionCoordinator<RecordingHandler>,
        now: Instant,
    }

    impl Harness {
        fn mount(role_claim: Option<&str>) -> Self {
            Self::mount_with(EngineConfig::default(), MountContext::signed_in(role_claim))
        }

        fn mount_with(config: EngineConfig, context: MountContext) -> Self {
            let bus = InputBus::new();
            let now = Instant::now();
            let mut engine = InteractionCoordinator::mount(
                &config,
                ZoneRegistry::home_screen(),
                context,
                RecordingHandler::default(),
                &bus,
                now,
            );
            // Let the mount-time pass settle so scenarios start from Idle.
            let now = now + WINDOW;
            engine.poll(now);
            Self { bus, engine, now }
        }

        fn walk(&mut self, direction: Direction, steps: usize) {
            for _ in 0..steps {
                self.now += KEY_REPEAT;
                self.engine.step(direction, self.now);
            }
        }

        fn settle(&mut self) -> Option<Dispatch> {
            self.now += WINDOW;
            self.engine.poll(self.now)
        }

        fn navigations(&self) -> &[String] {
            &self.engine.handler().navigations
        }
    }

    #[test]
    fn mount_subscribes_and_starts_idle() {
        let harness = Harness::mount(Some("ROLE_USER"));
        assert!(harness.engine.is_active());
        assert_eq!(harness.bus.subscriber_count(), 1);
        assert_eq!(harness.engine.position(), Position::new(480, 576));
        assert_eq!(harness.engine.occupancy(), &Occupancy::Idle);
        assert!(harness.navigations().is_empty());
        assert_eq!(harness.engine.stats().passes_run, 1);
    }

    #[test]
    fn entering_pharmacy_navigates_to_drug_list() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.walk(Direction::Up, 9);
        assert_eq!(harness.engine.position(), Position::new(480, 288));

        let dispatch = harness.settle().expect("dispatch");
        assert_eq!(dispatch.zone_id, PHARMACY_ZONE_ID);
        assert_eq!(dispatch.effect, ZoneEffect::Navigate("/drugs".to_string()));
        assert_eq!(dispatch.trigger, DispatchTrigger::Overlap);
        assert_eq!(
            harness.engine.occupancy(),
            &Occupancy::Entered(PHARMACY_ZONE_ID.to_string())
        );
        assert_eq!(harness.navigations(), ["/drugs"]);
    }

    #[test]
    fn standing_in_zone_for_three_windows_dispatches_once() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.walk(Direction::Up, 9);

        assert!(harness.settle().is_some());
        assert!(harness.settle().is_none());
        assert!(harness.settle().is_none());
        assert_eq!(harness.navigations(), ["/drugs"]);
    }

    #[test]
    fn moving_within_same_zone_does_not_redispatch() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.walk(Direction::Up, 9);
        assert!(harness.settle().is_some());

        harness.walk(Direction::Left, 1);
        assert!(harness.settle().is_none());
        assert_eq!(harness.navigations(), ["/drugs"]);
        assert_eq!(harness.engine.stats().passes_run, 3);
    }

    #[test]
    fn leaving_and_reentering_dispatches_per_visit() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.walk(Direction::Up, 9);
        assert!(harness.settle().is_some());

        harness.walk(Direction::Down, 2);
        assert!(harness.settle().is_none());
        assert_eq!(harness.engine.occupancy(), &Occupancy::Idle);

        harness.walk(Direction::Up, 2);
        assert!(harness.settle().is_some());
        assert_eq!(harness.navigations(), ["/drugs", "/drugs"]);
    }

    #[test]
    fn switching_directly_between_zones_dispatches_new_zone() {
        let mut harness = Harness::mount(Some("ROLE_ADMIN"));
        harness.walk(Direction::Up, 9);
        assert!(harness.settle().is_some());

        harness.walk(Direction::Down, 2);
        let dispatch = harness.settle().expect("dispatch");
        assert_eq!(dispatch.zone_id, CREATE_DRUG_ZONE_ID);
        assert_eq!(harness.navigations(), ["/drugs", "/drugs/create"]);
    }

    #[test]
    fn burst_through_hidden_path_only_evaluates_final_position() {
        // Walking up from the spawn crosses the admin-only zone on the way.
        let mut harness = Harness::mount(Some("ROLE_ADMIN"));
        harness.walk(Direction::Up, 9);

        let dispatch = harness.settle().expect("dispatch");
        assert_eq!(dispatch.zone_id, PHARMACY_ZONE_ID);
        assert_eq!(harness.navigations(), ["/drugs"]);
        let stats = harness.engine.stats();
        assert_eq!(stats.passes_coalesced, 8);
        assert_eq!(stats.overlap_dispatches, 1);
    }

    #[test]
    fn poll_inside_quiescence_window_does_nothing() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.walk(Direction::Up, 9);
        let last_step = harness.now;

        assert!(harness.engine.poll(last_step + Duration::from_millis(99)).is_none());
        assert!(harness.engine.pending_detection_at().is_some());
        assert!(harness.engine.poll(last_step + WINDOW).is_some());
        assert!(harness.engine.pending_detection_at().is_none());
    }

    #[test]
    fn intermediate_position_in_zone_never_dispatches() {
        let mut harness = Harness::mount(Some("ROLE_ADMIN"));
        // Two steps up puts the avatar inside the create-drug zone.
        harness.walk(Direction::Up, 2);
        harness.now += Duration::from_millis(50);
        assert!(harness.engine.poll(harness.now).is_none());
        // Continue before the window elapses; the earlier pass is cancelled.
        harness.walk(Direction::Up, 7);
        let dispatch = harness.settle().expect("dispatch");
        assert_eq!(dispatch.zone_id, PHARMACY_ZONE_ID);
        assert_eq!(harness.navigations(), ["/drugs"]);
    }

    #[test]
    fn stepping_left_at_boundary_is_idempotent() {
        let config = EngineConfig {
            initial_position: Position::new(48, 576),
            ..EngineConfig::default()
        };
        let mut harness = Harness::mount_with(config, MountContext::signed_in(Some("ROLE_USER")));
        let min_x = harness.engine.position().x;
        assert_eq!(min_x, 48);

        harness.walk(Direction::Left, 5);
        assert_eq!(harness.engine.position().x, min_x);
        assert_eq!(harness.engine.stats().steps_blocked, 5);
        assert!(harness.engine.pending_detection_at().is_none());
    }

    #[test]
    fn logout_zone_invokes_logout_action() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.walk(Direction::Right, 6);
        harness.walk(Direction::Up, 9);

        let dispatch = harness.settle().expect("dispatch");
        assert_eq!(dispatch.zone_id, LOGOUT_ZONE_ID);
        assert_eq!(harness.engine.handler().actions, [ZoneAction::Logout]);
        assert!(harness.navigations().is_empty());
    }

    #[test]
    fn spawn_inside_zone_dispatches_after_first_window() {
        let bus = InputBus::new();
        let start = Instant::now();
        let config = EngineConfig {
            initial_position: Position::new(480, 176),
            ..EngineConfig::default()
        };
        let mut engine = InteractionCoordinator::mount(
            &config,
            ZoneRegistry::home_screen(),
            MountContext::signed_in(None),
            RecordingHandler::default(),
            &bus,
            start,
        );
        assert!(engine.poll(start).is_none());
        assert!(engine.poll(start + WINDOW).is_some());
        assert!(engine.poll(start + WINDOW * 3).is_none());
        assert_eq!(engine.handler().navigations, ["/drugs"]);
    }

    #[test]
    fn admin_sees_create_drug_zone_but_user_does_not() {
        let admin = Harness::mount(Some("ROLE_ADMIN"));
        let user = Harness::mount(Some("ROLE_USER"));

        assert!(admin
            .engine
            .visible_zones()
            .any(|zone| zone.id == CREATE_DRUG_ZONE_ID));
        assert!(!user
            .engine
            .visible_zones()
            .any(|zone| zone.id == CREATE_DRUG_ZONE_ID));
        assert_eq!(admin.engine.role(), Role::Admin);
        assert_eq!(user.engine.role(), Role::User);
    }

    #[test]
    fn unknown_or_missing_role_gets_least_privilege() {
        for claim in [None, Some("ROLE_SUPERUSER"), Some("")] {
            let harness = Harness::mount(claim);
            assert_eq!(harness.engine.role(), Role::User, "claim={claim:?}");
            assert_eq!(harness.engine.visible_zones().count(), 3);
        }
    }

    #[test]
    fn user_click_on_create_drug_coordinates_dispatches_nothing() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        assert!(harness.engine.click_at(Position::new(480, 432)).is_none());
        assert!(harness.engine.click_zone(CREATE_DRUG_ZONE_ID).is_none());
        assert!(harness.navigations().is_empty());
        assert_eq!(harness.engine.stats().clicks_ignored, 2);
    }

    #[test]
    fn admin_click_on_create_drug_coordinates_dispatches() {
        let mut harness = Harness::mount(Some("ROLE_ADMIN"));
        let dispatch = harness
            .engine
            .click_at(Position::new(480, 432))
            .expect("dispatch");
        assert_eq!(dispatch.zone_id, CREATE_DRUG_ZONE_ID);
        assert_eq!(dispatch.trigger, DispatchTrigger::Click);
        assert_eq!(harness.navigations(), ["/drugs/create"]);
    }

    #[test]
    fn click_dispatches_immediately_without_movement() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        let position = harness.engine.position();

        let dispatch = harness.engine.click_zone(PHARMACY_ZONE_ID).expect("dispatch");
        assert_eq!(dispatch.trigger, DispatchTrigger::Click);
        assert_eq!(harness.navigations(), ["/drugs"]);
        assert_eq!(harness.engine.position(), position);
        assert_eq!(harness.engine.occupancy(), &Occupancy::Idle);
        assert!(harness.engine.pending_detection_at().is_none());
    }

    #[test]
    fn click_does_not_suppress_later_overlap_dispatch() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        assert!(harness.engine.click_zone(PHARMACY_ZONE_ID).is_some());
        harness.walk(Direction::Up, 9);
        assert!(harness.settle().is_some());
        assert_eq!(harness.navigations(), ["/drugs", "/drugs"]);
    }

    #[test]
    fn unknown_zone_click_is_ignored() {
        let mut harness = Harness::mount(Some("ROLE_ADMIN"));
        assert!(harness.engine.click_zone("basement-zone").is_none());
        assert!(harness.engine.click_at(Position::new(5, 5)).is_none());
        assert!(harness.navigations().is_empty());
    }

    #[test]
    fn pump_processes_bus_events_in_order() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.bus.publish(InputEvent::key("Enter"));
        harness.bus.publish(InputEvent::key("ArrowUp"));
        harness.bus.publish(InputEvent::key("KeyA"));
        harness.bus.publish(InputEvent::ZoneClick(LOGOUT_ZONE_ID.to_string()));

        harness.now += KEY_REPEAT;
        let dispatch = harness.engine.pump(harness.now).expect("logout click");
        assert_eq!(dispatch.zone_id, LOGOUT_ZONE_ID);
        assert_eq!(harness.engine.position(), Position::new(448, 544));
        assert_eq!(harness.engine.stats().keys_ignored, 1);
        assert_eq!(harness.engine.stats().steps_applied, 2);
    }

    #[test]
    fn pump_runs_due_pass_after_events() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        for _ in 0..9 {
            harness.bus.publish(InputEvent::key("ArrowUp"));
        }
        harness.now += KEY_REPEAT;
        assert!(harness.engine.pump(harness.now).is_none());

        harness.now += WINDOW;
        let dispatch = harness.engine.pump(harness.now).expect("pharmacy pass");
        assert_eq!(dispatch.zone_id, PHARMACY_ZONE_ID);
    }

    #[test]
    fn pump_click_preempts_due_pass() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.walk(Direction::Up, 9);
        harness
            .bus
            .publish(InputEvent::ZoneClick(PROFILE_ZONE_ID.to_string()));
        harness.now += WINDOW;

        let dispatch = harness.engine.pump(harness.now).expect("profile click");
        assert_eq!(dispatch.zone_id, PROFILE_ZONE_ID);
        assert_eq!(dispatch.trigger, DispatchTrigger::Click);
        assert_eq!(harness.navigations(), ["/profile"]);
        assert_eq!(harness.engine.stats().overlap_dispatches, 0);
    }

    #[test]
    fn pump_fires_only_first_of_queued_clicks() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness
            .bus
            .publish(InputEvent::ZoneClick(PHARMACY_ZONE_ID.to_string()));
        harness
            .bus
            .publish(InputEvent::ZoneClick(LOGOUT_ZONE_ID.to_string()));
        harness.bus.publish(InputEvent::key("ArrowUp"));

        let dispatch = harness.engine.pump(harness.now).expect("pharmacy click");
        assert_eq!(dispatch.zone_id, PHARMACY_ZONE_ID);
        assert_eq!(harness.navigations(), ["/drugs"]);
        assert!(harness.engine.handler().actions.is_empty());
        assert_eq!(harness.engine.position(), Position::new(480, 576));
        assert!(harness.engine.pump(harness.now).is_none());
    }

    #[test]
    fn pointer_click_event_goes_through_bypass_path() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness
            .bus
            .publish(InputEvent::PointerClick(Position::new(100, 100)));
        let dispatch = harness.engine.pump(harness.now).expect("pointer click");
        assert_eq!(dispatch.effect, ZoneEffect::Navigate("/profile".to_string()));
    }

    #[test]
    fn unmount_releases_subscription_and_cancels_pass() {
        let mut harness = Harness::mount(Some("ROLE_USER"));
        harness.walk(Direction::Up, 9);
        assert!(harness.engine.pending_detection_at().is_some());

        let Harness { bus, engine, .. } = harness;
        let handler = engine.unmount();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(handler.navigations.is_empty());
    }

    #[test]
    fn dropping_engine_releases_subscription() {
        let harness = Harness::mount(Some("ROLE_USER"));
        let Harness { bus, engine, .. } = harness;
        assert_eq!(bus.subscriber_count(), 1);
        drop(engine);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn remounting_does_not_leave_dangling_listeners() {
        let bus = InputBus::new();
        let mut handler = RecordingHandler::default();
        for round in 0..3 {
            let start = Instant::now();
            let mut engine = InteractionCoordinator::mount(
                &EngineConfig::default(),
                ZoneRegistry::home_screen(),
                MountContext::signed_in(Some("ROLE_USER")),
                handler,
                &bus,
                start,
            );
            assert_eq!(bus.subscriber_count(), 1, "round={round}");
            bus.publish(InputEvent::ZoneClick(PHARMACY_ZONE_ID.to_string()));
            engine.pump(start);
            handler = engine.unmount();
        }
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(handler.navigations, ["/drugs", "/drugs", "/drugs"]);
    }

    #[test]
    fn missing_session_redirects_to_login_and_stays_inert() {
        let mut harness = Harness::mount_with(EngineConfig::default(), MountContext::signed_out());
        assert!(!harness.engine.is_active());
        assert_eq!(harness.bus.subscriber_count(), 0);
        assert_eq!(harness.navigations(), [LOGIN_ROUTE]);

        harness.bus.publish(InputEvent::key("ArrowUp"));
        assert!(harness.engine.pump(harness.now).is_none());
        harness.walk(Direction::Up, 9);
        assert!(harness.settle().is_none());
        assert!(harness.engine.click_zone(PHARMACY_ZONE_ID).is_none());
        assert_eq!(harness.engine.position(), Position::new(480, 576));
        assert_eq!(harness.navigations(), [LOGIN_ROUTE]);
    }
