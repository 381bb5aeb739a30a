use super::*;

fn drain(events: &mut broadcast::Receiver<DeskEvent>) -> Vec<DeskEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

fn log_messages(events: &[DeskEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            DeskEvent::Log(entry) => Some(entry.message.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn auto_connect_reports_connection_and_height() {
    let desk = SimulatedDesk::new(905);
    let mut events = desk.subscribe_events();

    desk.auto_connect().await;

    let events = drain(&mut events);
    assert!(events.contains(&DeskEvent::Connection("CONNECTED".to_string())));
    assert!(events.contains(&DeskEvent::Height(905)));
    let messages = log_messages(&events);
    assert_eq!(messages.first().map(String::as_str), Some("Connecting to desk..."));
    assert_eq!(
        messages.last().map(String::as_str),
        Some("Current height: 90.5 cm")
    );
    assert_eq!(
        desk.check_connection().await.expect("status"),
        ConnectionStatus::Connected
    );
}

#[tokio::test(start_paused = true)]
async fn check_connection_does_not_connect() {
    let desk = SimulatedDesk::new(900);
    assert_eq!(
        desk.check_connection().await.expect("status"),
        ConnectionStatus::NotConnected
    );
    desk.get_height().await.expect("height");
    assert_eq!(
        desk.check_connection().await.expect("status"),
        ConnectionStatus::Connected
    );
}

#[tokio::test(start_paused = true)]
async fn steps_are_clamped_to_the_range() {
    let desk = SimulatedDesk::new(1265);
    desk.move_by_step(true).await.expect("step up");
    assert_eq!(desk.height_mm().await, MAX_HEIGHT_MM);

    let low = SimulatedDesk::new(MIN_HEIGHT_MM);
    let mut events = low.subscribe_events();
    low.move_by_step(false).await.expect("step down");
    assert_eq!(low.height_mm().await, MIN_HEIGHT_MM);
    assert!(log_messages(&drain(&mut events)).contains(&"Already at target height".to_string()));
}

#[tokio::test(start_paused = true)]
async fn travel_pushes_intermediate_heights() {
    let desk = SimulatedDesk::with_motion(900, 20, Duration::from_millis(100));
    let mut events = desk.subscribe_events();

    desk.move_to_height(950).await.expect("move");

    let events = drain(&mut events);
    let heights: Vec<i32> = events
        .iter()
        .filter_map(|event| match event {
            DeskEvent::Height(mm) => Some(*mm),
            _ => None,
        })
        .collect();
    assert_eq!(heights, [920, 940, 950]);
    assert!(log_messages(&events).contains(&"Target height 95.0 cm reached".to_string()));
}

#[tokio::test(start_paused = true)]
async fn out_of_range_target_is_refused() {
    let desk = SimulatedDesk::new(900);
    let mut events = desk.subscribe_events();

    let err = desk.move_to_height(1300).await.expect_err("out of range");
    assert_eq!(err.to_string(), "target height out of range");
    assert_eq!(desk.height_mm().await, 900);

    let events = drain(&mut events);
    assert!(matches!(
        &events[0],
        DeskEvent::Log(entry)
            if entry.level == LogLevel::Error
                && entry.message == "Target height 130.0 cm out of range (62 - 127 cm)"
    ));
}

#[tokio::test(start_paused = true)]
async fn unreachable_desk_reports_not_connected() {
    let desk = SimulatedDesk::new(900);
    desk.set_reachable(false).await;
    let mut events = desk.subscribe_events();

    let err = desk.get_height().await.expect_err("no desk");
    assert_eq!(err.to_string(), "desk not found");

    let events = drain(&mut events);
    assert!(events.contains(&DeskEvent::Connection("NOT_CONNECTED".to_string())));
    assert!(log_messages(&events).contains(&"No desk found".to_string()));
}

#[tokio::test(start_paused = true)]
async fn disconnect_pushes_status_and_next_command_reconnects() {
    let desk = SimulatedDesk::new(900);
    desk.get_height().await.expect("connect");
    let mut events = desk.subscribe_events();

    desk.disconnect().await;
    desk.get_height().await.expect("reconnect");

    let events = drain(&mut events);
    assert_eq!(
        events.first(),
        Some(&DeskEvent::Connection("NOT_CONNECTED".to_string()))
    );
    assert_eq!(
        events.last(),
        Some(&DeskEvent::Connection("CONNECTED".to_string()))
    );
}
