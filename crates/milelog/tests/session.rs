//! End-to-end sessions against an on-disk journey store.

use milelog::export::{file_name, format_share};
use milelog::location::{CoordinateLabels, Coordinates, FixedPosition, UnavailablePosition};
use milelog::logging::init_test_logging;
use milelog::{
    FileSink, FixedClock, JourneyMachine, JourneyStep, JourneyStore, Locator, Session,
    ShareChain, SqliteStore,
};

const NOW: i64 = 1_704_067_200_000;

fn session_at(
    db: &std::path::Path,
    exports: &std::path::Path,
    locator: Locator,
) -> Session<SqliteStore> {
    let store = SqliteStore::open(db, "journeys").unwrap();
    let machine = JourneyMachine::new(store, locator, Box::new(FixedClock::new("1/1/2024", NOW)));
    Session::new(machine, ShareChain::new(), FileSink::new(exports))
}

fn offline() -> Locator {
    Locator::new(Box::new(UnavailablePosition), Box::new(CoordinateLabels))
}

async fn drive(session: &mut Session<SqliteStore>, script: &str) -> String {
    let mut out = Vec::new();
    session.run(script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_recorded_journey_survives_reopen() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data").join("journeys.db");

    let mut session = session_at(&db, dir.path(), offline());
    let output = drive(
        &mut session,
        "start\nSW1A 1AA\nClient visit\n1000\n\nEC1A 1BB\n1050\ndownload\nquit\n",
    )
    .await;
    assert!(output.contains("Journey saved."));
    drop(session);

    let store = SqliteStore::open(&db, "journeys").unwrap();
    let records = store.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        format_share(&records[0]),
        "Business Journey Log\nDate: 1/1/2024\nPurpose: Client visit\nStart: SW1A 1AA\n\
         End: EC1A 1BB\nStart Mileage: 1000\nEnd Mileage: 1050\nTotal Distance: 50 miles"
    );

    assert_eq!(file_name(&records[0]), "journey-1/1/2024.txt");
    let saved = std::fs::read_to_string(dir.path().join("journey-1_1_2024.txt")).unwrap();
    assert!(saved.contains("Start Location: SW1A 1AA\nEnd Location: EC1A 1BB"));
}

#[tokio::test]
async fn test_cancelled_journey_is_not_stored() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("journeys.db");

    let mut session = session_at(&db, dir.path(), offline());
    drive(&mut session, "start\nSW1A 1AA\nClient visit\n1000\n\n:cancel\n").await;

    assert_eq!(session.machine().step(), JourneyStep::Idle);
    assert!(session.machine().store().list().unwrap().is_empty());
}

#[tokio::test]
async fn test_two_journeys_then_delete_first() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("journeys.db");
    let coords = Coordinates::new(51.5014, -0.1419).unwrap();
    let located = Locator::new(Box::new(FixedPosition::new(coords)), Box::new(CoordinateLabels));

    let mut session = session_at(&db, dir.path(), located);
    let script = format!(
        "start\nDepot run\n200\n\n260\nnew\n\
         start\nSite survey\n260\n\n300\nhistory\ndelete {NOW}\nback\nquit\n"
    );
    let output = drive(&mut session, &script).await;

    assert!(output.contains(&format!("Journey {NOW} deleted.")));
    let records = session.into_machine().store().list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.0, NOW + 1);
    assert_eq!(records[0].purpose, "Site survey");
    assert_eq!(records[0].start_location, "Location: 51.5014, -0.1419");
    assert_eq!(records[0].total_distance, 40);
}
