use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Opcode tables consulted by the compiler.
///
/// The tables are filled once and only read afterwards; the compiler owns
/// its copy for its whole lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupTables {
    /// opcode -> attribute written on the context binding
    pub setters: HashMap<String, String>,

    /// opcode -> attribute read off the context binding
    pub getters: HashMap<String, String>,

    /// opcode -> API method invoked on the context binding
    pub methods: HashMap<String, String>,

    /// Methods taking a trailing callback built from the block's body.
    pub clamps: HashSet<String>,
}

impl LookupTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setter(&self, opcode: &str) -> Option<&str> {
        self.setters.get(opcode).map(String::as_str)
    }

    pub fn getter(&self, opcode: &str) -> Option<&str> {
        self.getters.get(opcode).map(String::as_str)
    }

    pub fn method(&self, opcode: &str) -> Option<&str> {
        self.methods.get(opcode).map(String::as_str)
    }

    pub fn is_clamp(&self, opcode: &str) -> bool {
        self.clamps.contains(opcode)
    }

    pub fn with_setter(mut self, opcode: &str, name: &str) -> Self {
        self.setters.insert(opcode.to_string(), name.to_string());
        self
    }

    pub fn with_getter(mut self, opcode: &str, name: &str) -> Self {
        self.getters.insert(opcode.to_string(), name.to_string());
        self
    }

    pub fn with_method(mut self, opcode: &str, name: &str) -> Self {
        self.methods.insert(opcode.to_string(), name.to_string());
        self
    }

    pub fn with_clamp(mut self, opcode: &str) -> Self {
        self.clamps.insert(opcode.to_string());
        self
    }

    /// Built-in tables for the Music Blocks mouse API.
    pub fn music_blocks() -> Self {
        Self {
            setters: to_map(SETTERS),
            getters: to_map(GETTERS),
            methods: to_map(METHODS),
            clamps: CLAMPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ─────────────────────────────── Clamps ───────────────────────────────

const CLAMPS: &[&str] = &[
    // rhythm
    "newnote",
    "osctime",
    "rhythmicdot2",
    "tie",
    "multiplybeatfactor",
    "newswing2",
    // meter
    "drift",
    // pitch
    "accidental",
    "setscalartransposition",
    "settransposition",
    "invert1",
    // intervals
    "definemode",
    "interval",
    "semitoneinterval",
    // tone
    "settimbre",
    "vibrato",
    "chorus",
    "phaser",
    "tremolo",
    "dis",
    "harmonic2",
    // ornament
    "newstaccato",
    "newslur",
    "neighbor2",
    // volume
    "crescendo",
    "decrescendo",
    "articulation",
    // drum
    "setdrum",
    "mapdrum",
];

// ─────────────────────────────── Setters ──────────────────────────────

const SETTERS: &[(&str, &str)] = &[
    ("pickup", "PICKUP"),
    ("movable", "MOVEABLE"),
    ("setnotevolume", "MASTERVOLUME"),
    ("setpanning", "PANNING"),
];

// ─────────────────────────────── Getters ──────────────────────────────

const GETTERS: &[(&str, &str)] = &[
    // rhythm
    ("mynotevalue", "NOTEVALUE"),
    // meter
    ("elapsednotes", "WHOLENOTESPLAYED"),
    ("beatvalue", "BEATCOUNT"),
    ("measurevalue", "MEASURECOUNT"),
    ("bpmfactor", "BPM"),
    ("beatfactor", "BEATFACTOR"),
    ("currentmeter", "CURRENTMETER"),
    // pitch
    ("deltapitch2", "SCALARCHANGEINPITCH"),
    ("deltapitch", "CHANGEINPITCH"),
    ("consonantstepsizeup", "SCALARSTEPUP"),
    ("consonantstepsizedown", "SCALARSTEPDOWN"),
    // intervals
    ("key", "CURRENTKEY"),
    ("currentmode", "CURRENTMODE"),
    ("modelength", "MODELENGTH"),
    // volume
    ("notevolumefactor", "MASTERVOLUME"),
];

// ─────────────────────────────── Methods ──────────────────────────────

const METHODS: &[(&str, &str)] = &[
    // rhythm
    ("newnote", "playNote"),
    ("osctime", "playNoteMillis"),
    ("rest2", "playRest"),
    ("rhythmicdot2", "dot"),
    ("tie", "tie"),
    ("multiplybeatfactor", "multiplyNoteValue"),
    ("newswing2", "swing"),
    // meter
    ("meter", "setMeter"),
    ("setbpm3", "setBPM"),
    ("setmasterbpm2", "setMasterBPM"),
    ("everybeatdo", "onEveryNoteDo"),
    ("everybeatdonew", "onEveryBeatDo"),
    ("onbeatdo", "onStrongBeatDo"),
    ("offbeatdo", "onWeakBeatDo"),
    ("drift", "setNoClock"),
    ("elapsednotes2", "getNotesPlayed"),
    // pitch
    ("pitch", "playPitch"),
    ("steppitch", "stepPitch"),
    ("nthmodalpitch", "playNthModalPitch"),
    ("pitchnumber", "playPitchNumber"),
    ("hertz", "playHertz"),
    ("accidental", "setAccidental"),
    ("setscalartransposition", "setScalarTranspose"),
    ("settransposition", "setSemitoneTranspose"),
    ("register", "setRegister"),
    ("invert1", "invert"),
    ("setpitchnumberoffset", "setPitchNumberOffset"),
    ("number2pitch", "numToPitch"),
    ("number2octave", "numToOctave"),
    // intervals ("definemode" has no API method yet)
    ("setkey2", "setKey"),
    ("interval", "setScalarInterval"),
    ("semitoneinterval", "setSemitoneInterval"),
    ("settemperament", "setTemperament"),
    // tone
    ("settimbre", "setInstrument"),
    ("vibrato", "doVibrato"),
    ("chorus", "doChorus"),
    ("phaser", "doPhaser"),
    ("tremolo", "doTremolo"),
    ("dis", "doDistortion"),
    ("harmonic2", "doHarmonic"),
    // ornament
    ("newstaccato", "setStaccato"),
    ("newslur", "setSlur"),
    ("neighbor2", "doNeighbor"),
    // volume
    ("crescendo", "doCrescendo"),
    ("decrescendo", "doDecrescendo"),
    ("articulation", "setRelativeVolume"),
    ("setsynthvolume", "setSynthVolume"),
    ("synthvolumefactor", "getSynthVolume"),
    // drum
    ("playdrum", "playDrum"),
    ("setdrum", "setDrum"),
    ("mapdrum", "mapPitchToDrum"),
    ("playnoise", "playNoise"),
    // number
    ("random", "MathUtility.doRandom"),
    ("oneOf", "MathUtility.doOneOf"),
    ("distance", "MathUtility.doCalculateDistance"),
    // graphics
    ("forward", "doForward"),
    ("back", "doForward"),
    ("right", "doRight"),
    ("left", "doRight"),
    ("setxy", "doSetXY"),
    ("setheading", "doSetHeading"),
    ("arc", "doArc"),
    ("bezier", "doBezier"),
    ("controlpoint1", "setControlPoint1"),
    ("controlpoint2", "setControlPoint2"),
    ("clear", "doClear"),
    ("scrollxy", "doScrollXY"),
    // pen
    ("setcolor", "doSetColor"),
    ("setgrey", "doSetChroma"),
    ("setshade", "doSetValue"),
    ("sethue", "doSetHue"),
    ("settranslucency", "doSetPenAlpha"),
    ("setpensize", "doSetPensize"),
    ("penup", "doPenUp"),
    ("pendown", "doPenDown"),
    ("setfont", "doSetFont"),
];
