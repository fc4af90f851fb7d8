//! End-to-end behavior of a schema-declared codec: parse, build, validate,
//! re-serialize.
//!
//! The schema models a replay-search endpoint plus one decoder-style sparse
//! array: `time`/`range` select a window, `text` and `almmask` are mutually
//! exclusive match filters, `connections` carries indexed connection
//! strings.

use zenquery::{Param, ParamSet, QueryError, Rule, Schema, SetError, SparseArray, parse};

const TIME: Param<i64> = Param::int("time", 0).bounded(0, i64::MAX);
const RANGE: Param<i64> = Param::int("range", i32::MAX as i64);
const TEXT: Param<String> = Param::text("text", "");
const ALMMASK: Param<u64> = Param::hex("almmask", 0);
const CAM: Param<i64> = Param::int("cam", 1).disallowing(0);
const GAMMA: Param<i64, Option<i64>> = Param::int_opt("gamma");
const AUDIO: Param<bool> = Param::flag("audio", false);
const SYSMASK: Param<u64> = Param::hex_long("sysmask", 0);
const CONNECTIONS: Param<(u32, String), SparseArray<String>> = Param::sparse_text("connections");

static RULES: [Rule; 1] = [Rule::mutually_exclusive(
    &[TEXT.def(), ALMMASK.def()],
    "text and almmask are mutually exclusive",
)];
static SCHEMA: Schema = Schema::new(
    &[
        TIME.def(),
        RANGE.def(),
        TEXT.def(),
        ALMMASK.def(),
        CAM.def(),
        GAMMA.def(),
        AUDIO.def(),
        SYSMASK.def(),
        CONNECTIONS.def(),
    ],
    &RULES,
);

fn empty() -> ParamSet {
    ParamSet::new(&SCHEMA)
}

/// Serialize and parse back with the same schema.
fn reparse(set: &ParamSet) -> ParamSet {
    let q = set.to_query();
    parse(&q, &SCHEMA).unwrap_or_else(|e| panic!("round trip failed for {q:?}: {e:?}"))
}

mod search_scenario {
    use super::*;

    #[test]
    fn parse_fills_unmentioned_parameters_with_defaults() {
        let set = parse("?time=100&text=hello", &SCHEMA).unwrap();
        assert_eq!(set.get(&TIME), 100);
        assert_eq!(set.get(&RANGE), i64::from(i32::MAX));
        assert_eq!(set.get(&TEXT), "hello");
        assert_eq!(set.get(&ALMMASK), 0);
    }

    #[test]
    fn serialization_is_minimal_and_schema_ordered() {
        let set = parse("?time=100&text=hello", &SCHEMA).unwrap();
        assert_eq!(set.to_query(), "time=100&text=hello");
    }

    #[test]
    fn exclusive_filter_rejected_on_a_built_set() {
        let set = parse("?time=100&text=hello", &SCHEMA).unwrap();
        assert!(matches!(
            set.with(&ALMMASK, 5),
            Err(SetError::Validation { .. })
        ));
    }

    #[test]
    fn full_device_url_is_accepted() {
        let set = parse("http://camera/replay_search.frm?time=100&almmask=a0", &SCHEMA).unwrap();
        assert_eq!(set.get(&TIME), 100);
        assert_eq!(set.get(&ALMMASK), 0xa0);
    }
}

mod round_trip {
    use super::*;

    #[test]
    fn built_sets_survive_reserialization() {
        let set = empty()
            .with(&TIME, 86_400)
            .unwrap()
            .with(&RANGE, 3_600)
            .unwrap()
            .with(&GAMMA, -2)
            .unwrap()
            .with(&CONNECTIONS, (4, String::from("slave=10.0.0.2,port=80")))
            .unwrap();
        let back = reparse(&set);
        assert_eq!(back.get(&TIME), 86_400);
        assert_eq!(back.get(&RANGE), 3_600);
        assert_eq!(back.get(&GAMMA), Some(-2));
        assert_eq!(back.get(&CONNECTIONS), set.get(&CONNECTIONS));
    }

    #[test]
    fn all_defaults_serializes_to_nothing_and_back() {
        let set = empty();
        assert_eq!(set.to_query(), "");
        let back = reparse(&set);
        assert_eq!(back.get(&TIME), 0);
        assert_eq!(back.get(&GAMMA), None);
        assert!(back.get(&CONNECTIONS).is_empty());
    }

    #[test]
    fn sparse_runs_and_gaps_round_trip() {
        let set = empty()
            .with(&CONNECTIONS, (16, String::from("a")))
            .unwrap()
            .with(&CONNECTIONS, (17, String::from("b")))
            .unwrap()
            .with(&CONNECTIONS, (40, String::from("c")))
            .unwrap();
        assert_eq!(set.to_query(), "connections[16]=a,b&connections[40]=c");
        assert_eq!(reparse(&set).get(&CONNECTIONS), set.get(&CONNECTIONS));
    }

    #[test]
    fn flag_and_wide_hex_round_trip() {
        let set = parse("audio=TRUE&sysmask=0xFF00000000", &SCHEMA).unwrap();
        assert!(set.get(&AUDIO));
        assert_eq!(set.get(&SYSMASK), 0xff_0000_0000);
        assert_eq!(set.to_query(), "audio=true&sysmask=ff00000000");
        assert_eq!(reparse(&set).get(&SYSMASK), 0xff_0000_0000);
    }

    #[test]
    fn hex_parameters_reserialize_lowercase() {
        let set = parse("almmask=FF", &SCHEMA).unwrap();
        assert_eq!(set.to_query(), "almmask=ff");
        assert_eq!(reparse(&set).get(&ALMMASK), 255);
    }
}

mod errors {
    use super::*;

    #[test]
    fn out_of_range_surfaces_from_parse() {
        assert_eq!(
            parse("time=-5", &SCHEMA),
            Err(QueryError::Set(SetError::OutOfRange {
                param: "time",
                value: -5,
                min: 0,
                max: i64::MAX,
            }))
        );
    }

    #[test]
    fn banned_value_surfaces_from_parse() {
        assert_eq!(
            parse("cam=0", &SCHEMA),
            Err(QueryError::Set(SetError::IllegalValue { param: "cam" }))
        );
    }

    #[test]
    fn mutual_exclusion_surfaces_from_parse_in_either_order() {
        for url in ["text=a&almmask=1", "almmask=1&text=a"] {
            assert!(matches!(
                parse(url, &SCHEMA),
                Err(QueryError::Set(SetError::Validation { .. }))
            ));
        }
    }

    #[test]
    fn hex_value_wider_than_its_codec_rejected_at_assignment() {
        // A value the 32-bit codec could not reparse is never stored, so
        // every buildable set still serializes to parseable text.
        assert!(matches!(
            empty().with(&ALMMASK, u64::from(u32::MAX) + 1),
            Err(SetError::Conversion {
                param: "almmask",
                ..
            })
        ));
        // The 64-bit parameter takes the full range and round-trips.
        let s = empty().with(&SYSMASK, u64::MAX).unwrap();
        assert_eq!(reparse(&s).get(&SYSMASK), u64::MAX);
    }

    #[test]
    fn duplicate_optional_rejected() {
        assert_eq!(
            parse("gamma=1&gamma=2", &SCHEMA),
            Err(QueryError::Set(SetError::AlreadySet { param: "gamma" }))
        );
    }
}

mod codecs_and_options {
    use super::*;
    use zenquery::{ConvertError, QueryError, TextCodec, Value};

    fn decode_level(text: &str) -> Result<Value, ConvertError> {
        match text {
            "low" => Ok(Value::Int(0)),
            "high" => Ok(Value::Int(1)),
            _ => Err(ConvertError::new("expected low or high")),
        }
    }

    fn encode_level(value: &Value) -> Result<String, ConvertError> {
        match value {
            Value::Int(0) => Ok(String::from("low")),
            Value::Int(1) => Ok(String::from("high")),
            _ => Err(ConvertError::new("expected a level value")),
        }
    }

    const LEVEL_CODEC: TextCodec = TextCodec::partial(decode_level, encode_level);
    const LEVEL: Param<i64> = Param::int("level", 0).with_codec(LEVEL_CODEC);
    const MUTED: Param<bool, Option<bool>> = Param::flag_opt("muted");
    const BAUD: Param<u64, Option<u64>> = Param::hex_opt("baud");
    const LABEL: Param<String, Option<String>> = Param::text_opt("label");
    const ZONES: Param<(u32, String), SparseArray<String>> =
        Param::sparse_text("zones").disallowing_text("none");

    static LOCAL: Schema = Schema::new(
        &[LEVEL.def(), MUTED.def(), BAUD.def(), LABEL.def(), ZONES.def()],
        &[],
    );

    #[test]
    fn replaced_codec_drives_both_directions() {
        let set = parse("level=high", &LOCAL).unwrap();
        assert_eq!(set.get(&LEVEL), 1);
        assert_eq!(set.to_query(), "level=high");
        assert!(matches!(
            parse("level=medium", &LOCAL),
            Err(QueryError::Set(SetError::Conversion { param: "level", .. }))
        ));
    }

    #[test]
    fn optional_variants_read_absent_until_set() {
        let blank = ParamSet::new(&LOCAL);
        assert_eq!(blank.get(&MUTED), None);
        assert_eq!(blank.get(&BAUD), None);
        assert_eq!(blank.get(&LABEL), None);

        let set = parse("muted=false&baud=1c200&label=east", &LOCAL).unwrap();
        assert_eq!(set.get(&MUTED), Some(false));
        assert_eq!(set.get(&BAUD), Some(0x1c200));
        assert_eq!(set.require(&LABEL), Ok(String::from("east")));
        assert_eq!(set.to_query(), "muted=false&baud=1c200&label=east");
    }

    #[test]
    fn banned_array_element_rejected() {
        assert_eq!(
            ParamSet::new(&LOCAL).with(&ZONES, (0, String::from("none"))),
            Err(SetError::IllegalValue { param: "zones" })
        );
        assert_eq!(
            parse("zones[0]=door,none", &LOCAL),
            Err(QueryError::Set(SetError::IllegalValue { param: "zones" }))
        );
    }
}

mod sharing {
    use super::*;

    #[test]
    fn branches_from_a_shared_base_are_independent() {
        let base = empty().with(&TIME, 1).unwrap();
        std::thread::scope(|scope| {
            let a = scope.spawn(|| base.with(&TEXT, String::from("door")).unwrap());
            let b = scope.spawn(|| base.with(&ALMMASK, 0xff).unwrap());
            let a = a.join().unwrap();
            let b = b.join().unwrap();
            assert_eq!(a.get(&TEXT), "door");
            assert_eq!(a.get(&ALMMASK), 0);
            assert_eq!(b.get(&ALMMASK), 0xff);
            assert_eq!(b.get(&TEXT), "");
        });
        // The shared base never changed.
        assert_eq!(base.get(&TIME), 1);
        assert_eq!(base.get(&TEXT), "");
        assert_eq!(base.get(&ALMMASK), 0);
    }
}
