use super::recording::{RecordingDisplay, Shown};
use super::*;
use crate::error::EngineError;
use crate::geo::{ConfiguredLocation, GeoPosition};
use crate::qibla::{NoHeading, ReaderHeading};
use crate::time_source::ManualTimeSource;
use crate::timings::provider::MockTimingProvider;
use crate::timings::{Prayer, PrayerTimingSet};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use std::io::Cursor;
use std::sync::mpsc::{self, Receiver};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn riyadh(d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
    Tz::Asia__Riyadh
        .with_ymd_and_hms(2026, 10, d, h, mi, s)
        .single()
        .unwrap()
        .with_timezone(&Local)
}

fn timings_for(day: u32) -> PrayerTimingSet {
    PrayerTimingSet::new(
        [t(5, 0), t(12, 10), t(15, 30), t(18, 5), t(19, 20)],
        Tz::Asia__Riyadh,
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
    )
}

struct Harness {
    recorder: Arc<Mutex<RecordingDisplay>>,
    clock: Arc<ManualTimeSource>,
    events: Receiver<SessionEvent>,
    params: SessionParams,
}

fn harness(provider: MockTimingProvider, start: DateTime<Local>) -> Harness {
    crate::logger::Log::set_enabled(false);
    let (recorder, display) = RecordingDisplay::shared();
    let clock = Arc::new(ManualTimeSource::new(start));
    let (tx, rx) = mpsc::channel();

    let params = SessionParams {
        location: Box::new(ConfiguredLocation::new(Some(21.0), Some(39.0), true)),
        provider: Box::new(provider),
        geocoder: None,
        heading: Box::new(NoHeading),
        display,
        events: tx,
        clock: clock.clone(),
        method: 2,
        tick_interval: Duration::from_millis(10),
    };

    Harness {
        recorder,
        clock,
        events: rx,
        params,
    }
}

fn single_fetch() -> MockTimingProvider {
    let mut provider = MockTimingProvider::new();
    provider
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Ok(timings_for(18)));
    provider
}

fn shown(recorder: &Arc<Mutex<RecordingDisplay>>) -> Vec<Shown> {
    recorder.lock().unwrap().shown().to_vec()
}

#[test]
fn test_start_shows_schedule_and_first_countdown() {
    let h = harness(single_fetch(), riyadh(18, 18, 30, 0));
    let session = Session::start(h.params).unwrap();

    assert_eq!(session.next_prayer().prayer, Prayer::Isha);
    assert!(session.is_counting());

    let shown = shown(&h.recorder);
    assert_eq!(shown[0], Shown::Location("Unknown Location".to_string()));
    assert!(matches!(shown[1], Shown::Timings(ref rows) if rows.len() == 5));
    assert!(matches!(shown[2], Shown::Qibla(b) if (b - session.static_bearing()).abs() < 1e-9));
    match &shown[3] {
        Shown::NextPrayer(prayer, target) => {
            assert_eq!(*prayer, Prayer::Isha);
            assert_eq!(target.format("%Y-%m-%d %H:%M").to_string(), "2026-10-18 19:20");
        }
        other => panic!("expected next prayer, got {other:?}"),
    }
    assert_eq!(shown[4], Shown::Countdown("0h 50m 0s".to_string()));
}

#[test]
fn test_method_is_passed_to_provider() {
    let mut provider = MockTimingProvider::new();
    provider
        .expect_fetch()
        .withf(|position, method, _| *method == 4 && position.latitude() == 21.0)
        .times(1)
        .returning(|_, _, _| Ok(timings_for(18)));

    let mut h = harness(provider, riyadh(18, 18, 30, 0));
    h.params.method = 4;
    let _session = Session::start(h.params).unwrap();
}

#[test]
fn test_location_denied_stops_before_fetch() {
    let mut provider = MockTimingProvider::new();
    provider.expect_fetch().times(0);

    let mut h = harness(provider, riyadh(18, 18, 30, 0));
    h.params.location = Box::new(ConfiguredLocation::new(Some(21.0), Some(39.0), false));

    let err = Session::start(h.params).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::LocationDenied)
    ));

    let recorder = h.recorder.lock().unwrap();
    assert_eq!(recorder.len(), 1);
    assert!(recorder.errors()[0].starts_with("Location access denied"));
}

#[test]
fn test_provider_failure_shows_fetch_error_only() {
    let mut provider = MockTimingProvider::new();
    provider
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Err(EngineError::ProviderUnavailable("offline".into())));

    let h = harness(provider, riyadh(18, 18, 30, 0));
    assert!(Session::start(h.params).is_err());

    std::thread::sleep(Duration::from_millis(40));
    let shown = shown(&h.recorder);
    assert_eq!(
        shown,
        vec![Shown::Error(
            "Error fetching prayer times. Please try again later.".to_string()
        )]
    );
}

#[test]
fn test_arrival_is_reported_once_and_rearm_wraps_to_fajr() {
    let h = harness(single_fetch(), riyadh(18, 19, 19, 58));
    let mut session = Session::start(h.params).unwrap();

    h.clock.set(riyadh(18, 19, 20, 0));
    let event = h.events.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(event, SessionEvent::Arrived(Prayer::Isha));

    std::thread::sleep(Duration::from_millis(40));
    assert!(!session.is_counting());
    assert!(h.events.try_recv().is_err());

    let arrivals = shown(&h.recorder)
        .into_iter()
        .filter(|s| matches!(s, Shown::Arrived(_)))
        .count();
    assert_eq!(arrivals, 1);

    session.rearm().unwrap();
    assert_eq!(session.next_prayer().prayer, Prayer::Fajr);
    let last_next = shown(&h.recorder)
        .into_iter()
        .rev()
        .find(|s| matches!(s, Shown::NextPrayer(..)));
    match last_next {
        Some(Shown::NextPrayer(Prayer::Fajr, target)) => {
            assert_eq!(target.format("%Y-%m-%d %H:%M").to_string(), "2026-10-19 05:00");
        }
        other => panic!("expected Fajr target, got {other:?}"),
    }
}

#[test]
fn test_rearm_on_a_new_day_refetches() {
    let mut provider = MockTimingProvider::new();
    let mut seq = mockall::Sequence::new();
    provider
        .expect_fetch()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(timings_for(18)));
    provider
        .expect_fetch()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|_, _, date| date.to_string() == "2026-10-19")
        .returning(|_, _, _| Ok(timings_for(19)));

    let h = harness(provider, riyadh(18, 23, 0, 0));
    let mut session = Session::start(h.params).unwrap();
    assert_eq!(session.timings().date().to_string(), "2026-10-18");

    h.clock.set(riyadh(19, 5, 0, 0));
    session.rearm().unwrap();

    assert_eq!(session.timings().date().to_string(), "2026-10-19");
    assert_eq!(session.next_prayer().prayer, Prayer::Dhuhr);
}

#[test]
fn test_fetch_requests_the_clock_day_and_same_day_rearm_reuses_it() {
    let day = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
    let at = |h, m| {
        Tz::Asia__Riyadh
            .with_ymd_and_hms(2026, 1, 10, h, m, 0)
            .single()
            .unwrap()
            .with_timezone(&Local)
    };

    let mut provider = MockTimingProvider::new();
    provider
        .expect_fetch()
        .withf(move |_, _, date| *date == day)
        .times(1)
        .returning(|_, _, date| {
            Ok(PrayerTimingSet::new(
                [t(5, 20), t(12, 20), t(15, 25), t(17, 40), t(19, 10)],
                Tz::Asia__Riyadh,
                date,
            ))
        });

    let h = harness(provider, at(18, 30));
    let mut session = Session::start(h.params).unwrap();
    assert_eq!(session.timings().date(), day);

    for (hour, minute) in [(19, 11), (21, 0), (23, 59)] {
        h.clock.set(at(hour, minute));
        session.rearm().unwrap();
        assert_eq!(session.next_prayer().prayer, Prayer::Fajr);
    }
    assert_eq!(session.timings().date(), day);
}

#[test]
fn test_close_stops_all_updates() {
    let mut h = harness(single_fetch(), riyadh(18, 18, 30, 0));
    h.params.heading = Box::new(ReaderHeading::new(
        "test",
        Box::new(Cursor::new("40\n".to_string())),
    ));
    let mut session = Session::start(h.params).unwrap();

    std::thread::sleep(Duration::from_millis(50));
    session.close();
    assert!(!session.is_counting());
    let after_close = h.recorder.lock().unwrap().len();

    h.clock.set(riyadh(18, 19, 20, 0));
    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(h.recorder.lock().unwrap().len(), after_close);
    assert!(h.events.try_recv().is_err());

    // Closing twice is harmless
    session.close();
}

#[test]
fn test_heading_samples_rotate_pointer() {
    let mut h = harness(single_fetch(), riyadh(18, 18, 30, 0));
    h.params.heading = Box::new(ReaderHeading::new(
        "test",
        Box::new(Cursor::new("40\n".to_string())),
    ));
    let session = Session::start(h.params).unwrap();
    let expected = crate::qibla::display_bearing(session.static_bearing(), 40.0);

    let mut pointer = None;
    for _ in 0..50 {
        pointer = shown(&h.recorder).into_iter().find_map(|s| match s {
            Shown::Pointer(heading, pointer) => Some((heading, pointer)),
            _ => None,
        });
        if pointer.is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    let (heading, pointer) = pointer.expect("pointer update");
    assert_eq!(heading, 40.0);
    assert!((pointer - expected).abs() < 1e-9);
}

#[test]
fn test_position_is_kept() {
    let h = harness(single_fetch(), riyadh(18, 18, 30, 0));
    let session = Session::start(h.params).unwrap();
    assert_eq!(session.position(), GeoPosition::new(21.0, 39.0).unwrap());
}
