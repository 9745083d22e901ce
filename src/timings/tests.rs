use super::provider::{MockTimingProvider, parse_timings_payload};
use super::*;
use crate::geo::GeoPosition;
use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn ts(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

fn sample_set() -> PrayerTimingSet {
    PrayerTimingSet::new(
        [t(5, 0), t(12, 10), t(15, 30), t(18, 5), t(19, 20)],
        Tz::Asia__Riyadh,
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
    )
}

fn position() -> GeoPosition {
    GeoPosition::new(21.0, 39.0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// True when every prayer in `set` is at or before `now`.
fn all_passed(set: &PrayerTimingSet, now: NaiveTime) -> bool {
    set.iter().all(|(_, time)| time <= now)
}

const SAMPLE_PAYLOAD: &str = r#"{
    "code": 200,
    "status": "OK",
    "data": {
        "timings": {
            "Fajr": "05:00",
            "Sunrise": "06:14",
            "Dhuhr": "12:10",
            "Asr": "15:30",
            "Sunset": "18:02",
            "Maghrib": "18:05",
            "Isha": "19:20",
            "Imsak": "04:50",
            "Midnight": "00:08"
        },
        "date": {
            "readable": "18 Oct 2026",
            "gregorian": { "date": "18-10-2026" }
        },
        "meta": {
            "latitude": 21.0,
            "longitude": 39.0,
            "timezone": "Asia/Riyadh",
            "method": { "id": 2 }
        }
    }
}"#;

// # Selector

#[test]
fn test_select_before_fajr_returns_fajr() {
    let set = sample_set();
    let next = select(&set, t(3, 15));
    assert_eq!(next.prayer, Prayer::Fajr);
    assert_eq!(next.time, t(5, 0));
    assert!(!all_passed(&set, t(3, 15)));
}

#[test]
fn test_select_between_prayers() {
    let set = sample_set();
    assert_eq!(select(&set, t(5, 1)).prayer, Prayer::Dhuhr);
    assert_eq!(select(&set, t(13, 0)).prayer, Prayer::Asr);
    assert_eq!(select(&set, t(17, 59)).prayer, Prayer::Maghrib);
}

#[test]
fn test_select_at_exact_prayer_time_counts_as_passed() {
    let set = sample_set();
    let next = select(&set, t(12, 10));
    assert_eq!(next.prayer, Prayer::Asr);

    // One second before is still upcoming
    assert_eq!(select(&set, ts(12, 9, 59)).prayer, Prayer::Dhuhr);
}

#[test]
fn test_select_after_isha_wraps_to_fajr_of_same_set() {
    let set = sample_set();
    let next = select(&set, t(22, 45));
    assert_eq!(next.prayer, Prayer::Fajr);
    assert_eq!(next.time, set.time(Prayer::Fajr));
    assert!(all_passed(&set, t(22, 45)));
}

#[test]
fn test_select_at_isha_wraps() {
    let set = sample_set();
    assert_eq!(select(&set, t(19, 20)).prayer, Prayer::Fajr);
    assert_eq!(select(&set, ts(23, 59, 59)).prayer, Prayer::Fajr);
}

#[test]
fn test_select_end_to_end_scenario_time() {
    let next = select(&sample_set(), t(18, 30));
    assert_eq!(
        next,
        NextPrayer {
            prayer: Prayer::Isha,
            time: t(19, 20)
        }
    );
}

// # Timing set construction

#[test]
fn test_parse_clock_time_accepts_annotations() {
    assert_eq!(parse_clock_time("04:32").unwrap(), t(4, 32));
    assert_eq!(parse_clock_time("04:32 (+03)").unwrap(), t(4, 32));
    assert_eq!(parse_clock_time("23:59").unwrap(), t(23, 59));
}

#[test]
fn test_parse_clock_time_rejects_garbage() {
    for raw in ["", "4", "25:00", "12:61", "noon", "12-30"] {
        assert!(
            matches!(parse_clock_time(raw), Err(EngineError::MalformedResponse(_))),
            "expected '{raw}' to be rejected"
        );
    }
}

#[test]
fn test_from_map_requires_all_five_names() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let mut map: HashMap<String, String> = Prayer::ALL
        .iter()
        .map(|p| (p.name().to_string(), "12:00".to_string()))
        .collect();
    assert!(PrayerTimingSet::from_map(&map, Tz::UTC, date).is_ok());

    map.remove("Asr");
    let err = PrayerTimingSet::from_map(&map, Tz::UTC, date).unwrap_err();
    assert!(matches!(err, EngineError::MalformedResponse(ref msg) if msg.contains("Asr")));
}

#[test]
fn test_iter_preserves_declared_order() {
    let names: Vec<&str> = sample_set().iter().map(|(p, _)| p.name()).collect();
    assert_eq!(names, ["Fajr", "Dhuhr", "Asr", "Maghrib", "Isha"]);
}

// # Provider payload parsing

#[test]
fn test_parse_payload_success() {
    let set = parse_timings_payload(SAMPLE_PAYLOAD, position(), date(2026, 10, 18)).unwrap();
    assert_eq!(set.time(Prayer::Fajr), t(5, 0));
    assert_eq!(set.time(Prayer::Isha), t(19, 20));
    assert_eq!(set.timezone(), Tz::Asia__Riyadh);
    assert_eq!(set.date(), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
}

#[test]
fn test_parse_payload_missing_prayer_is_malformed() {
    let payload = SAMPLE_PAYLOAD.replace("\"Isha\": \"19:20\",", "");
    // Isha was followed by a comma; removing it leaves valid JSON
    let err = parse_timings_payload(&payload, position(), date(2026, 10, 18)).unwrap_err();
    assert!(matches!(err, EngineError::MalformedResponse(_)));
}

#[test]
fn test_parse_payload_invalid_json_is_malformed() {
    let err = parse_timings_payload("Service Unavailable", position(), date(2026, 10, 18)).unwrap_err();
    assert!(matches!(err, EngineError::MalformedResponse(_)));

    let err = parse_timings_payload(r#"{"data": {}}"#, position(), date(2026, 10, 18)).unwrap_err();
    assert!(matches!(err, EngineError::MalformedResponse(_)));
}

#[test]
fn test_parse_payload_without_meta_uses_coordinate_timezone() {
    let payload = r#"{"data": {"timings": {
        "Fajr": "04:40", "Dhuhr": "11:50", "Asr": "15:10",
        "Maghrib": "17:45", "Isha": "19:00"
    }}}"#;
    let set = parse_timings_payload(payload, position(), date(2026, 10, 18)).unwrap();
    assert_eq!(set.timezone(), Tz::Asia__Riyadh);
}

#[test]
fn test_mock_provider_passes_method_through() {
    let mut provider = MockTimingProvider::new();
    provider
        .expect_fetch()
        .withf(|_, method, _| *method == 4)
        .times(1)
        .returning(|_, _, _| Ok(sample_set()));

    let set = provider.fetch(position(), 4, date(2026, 10, 18)).unwrap();
    assert_eq!(set, sample_set());
}

#[test]
fn test_parsed_set_carries_requested_date() {
    // The payload says 18-10-2026; the day asked for wins
    let set = parse_timings_payload(SAMPLE_PAYLOAD, position(), date(2026, 1, 10)).unwrap();
    assert_eq!(set.date(), date(2026, 1, 10));
}

#[test]
fn test_location_date_uses_position_zone() {
    // 22:30 UTC on the 17th is already the 18th in Riyadh
    let now = Tz::UTC
        .with_ymd_and_hms(2026, 10, 17, 22, 30, 0)
        .single()
        .unwrap()
        .with_timezone(&chrono::Local);
    assert_eq!(location_date(position(), now), date(2026, 10, 18));
}

// # Aladhan over HTTP

/// Answer one HTTP request with `body` and hand back its request line.
fn serve_once(body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            if header == "\r\n" || header.is_empty() {
                break;
            }
        }

        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .unwrap();
        request_line.trim_end().to_string()
    });

    (url, handle)
}

#[test]
fn test_aladhan_request_names_the_day() {
    let (url, server) = serve_once(SAMPLE_PAYLOAD);
    let provider = AladhanProvider::new(&url, Duration::from_secs(5)).unwrap();

    let set = provider.fetch(position(), 2, date(2026, 1, 10)).unwrap();
    let request_line = server.join().unwrap();

    assert!(
        request_line.starts_with("GET /timings/10-01-2026?"),
        "unexpected request: {request_line}"
    );
    assert!(request_line.contains("latitude=21"));
    assert!(request_line.contains("method=2"));
    assert_eq!(set.date(), date(2026, 1, 10));
    assert_eq!(set.time(Prayer::Isha), t(19, 20));
}

#[test]
fn test_aladhan_unreachable_is_provider_unavailable() {
    // Bind and drop to get a port with nothing listening
    let url = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let provider = AladhanProvider::new(&url, Duration::from_secs(2)).unwrap();

    let err = provider.fetch(position(), 2, date(2026, 1, 10)).unwrap_err();
    assert!(matches!(err, EngineError::ProviderUnavailable(_)));
}

/// Property-based tests
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Five strictly increasing minute-of-day values.
    fn ordered_set_strategy() -> impl Strategy<Value = PrayerTimingSet> {
        proptest::collection::btree_set(1u32..1439, 5).prop_map(|minutes| {
            let times: Vec<NaiveTime> = minutes
                .into_iter()
                .map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap())
                .collect();
            PrayerTimingSet::new(
                [times[0], times[1], times[2], times[3], times[4]],
                Tz::UTC,
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            )
        })
    }

    /// A set together with a time strictly after its Isha.
    fn after_isha_strategy() -> impl Strategy<Value = (PrayerTimingSet, NaiveTime)> {
        ordered_set_strategy().prop_flat_map(|set| {
            let isha = chrono::Timelike::num_seconds_from_midnight(&set.time(Prayer::Isha));
            ((isha + 1)..86_400).prop_map(move |secs| {
                let now = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
                (set.clone(), now)
            })
        })
    }

    fn time_strategy() -> impl Strategy<Value = NaiveTime> {
        (0u32..86_400).prop_map(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0).unwrap())
    }

    proptest! {
        #[test]
        fn test_before_fajr_selects_fajr(set in ordered_set_strategy(), offset in 1u32..86_400) {
            let fajr_secs = chrono::Timelike::num_seconds_from_midnight(&set.time(Prayer::Fajr));
            let now_secs = fajr_secs.saturating_sub(offset);
            prop_assume!(now_secs < fajr_secs);
            let now = NaiveTime::from_num_seconds_from_midnight_opt(now_secs, 0).unwrap();
            prop_assert_eq!(select(&set, now).prayer, Prayer::Fajr);
        }

        #[test]
        fn test_after_isha_wraps_to_fajr((set, now) in after_isha_strategy()) {
            let next = select(&set, now);
            prop_assert_eq!(next.prayer, Prayer::Fajr);
            prop_assert_eq!(next.time, set.time(Prayer::Fajr));
            prop_assert!(all_passed(&set, now));
        }

        #[test]
        fn test_never_selects_past_prayer_unless_wrapped(
            set in ordered_set_strategy(),
            now in time_strategy()
        ) {
            let next = select(&set, now);
            if all_passed(&set, now) {
                prop_assert_eq!(next.prayer, Prayer::Fajr);
            } else {
                prop_assert!(next.time > now);
                // It is also the earliest upcoming one
                for (_, time) in set.iter() {
                    if time > now {
                        prop_assert!(next.time <= time);
                    }
                }
            }
        }
    }
}
