//! SSML markup construction for Azure Speech.
//!
//! Text is XML-escaped and wrapped in a `<speak>` document naming the voice,
//! an optional prosody rate and an optional temperature parameter. Attribute
//! order and single-quote style match what the Azure SSML parser is fed by
//! the rest of our tooling, so keep them stable.

use std::collections::HashMap;
use std::fmt::Write;

use tracing::warn;

/// Voice used when a speaker has no entry in the voice table.
pub const DEFAULT_VOICE: &str = "zh-CN-YunxiNeural";

const SPEAK_NAMESPACE: &str = "http://www.w3.org/2001/10/synthesis";
const MSTTS_NAMESPACE: &str = "https://www.w3.org/2001/mstts";
const SPEAK_LANG: &str = "zh-CN";

/// A single synthesis request, before it is turned into markup.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub speaker_name: String,
    pub prosody_rate: Option<String>,
    pub temperature: f64,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, speaker_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker_name: speaker_name.into(),
            prosody_rate: None,
            temperature: 1.0,
        }
    }

    pub fn with_prosody_rate(mut self, rate: Option<String>) -> Self {
        self.prosody_rate = rate;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Speaker name → provider voice id.
#[derive(Debug, Clone, Default)]
pub struct VoiceTable {
    voices: HashMap<String, String>,
}

impl VoiceTable {
    pub fn new(voices: HashMap<String, String>) -> Self {
        Self { voices }
    }

    /// Resolve a speaker to a voice id. Unknown speakers get [`DEFAULT_VOICE`].
    pub fn resolve(&self, speaker_name: &str) -> &str {
        match self.voices.get(speaker_name) {
            Some(voice) if !voice.is_empty() => voice.as_str(),
            _ => {
                warn!(
                    "No voice configuration found for speaker {speaker_name}. Using default voice."
                );
                DEFAULT_VOICE
            }
        }
    }
}

/// Escape the five XML special characters.
///
/// `&` must go first, otherwise the entities produced for the other
/// characters would be escaped a second time.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Build the SSML document for a request.
pub fn build_ssml(request: &SynthesisRequest, voices: &VoiceTable) -> String {
    let text = escape_xml(&request.text);
    let voice_name = voices.resolve(&request.speaker_name);

    let mut ssml = SsmlWriter::default();
    ssml.open(
        "speak",
        &[
            ("version", "1.0"),
            ("xmlns", SPEAK_NAMESPACE),
            ("xmlns:mstts", MSTTS_NAMESPACE),
            ("xml:lang", SPEAK_LANG),
        ],
    );

    let parameters;
    let mut voice_attrs = vec![("name", voice_name)];
    if request.temperature != 1.0 {
        parameters = format!("temperature={}", format_temperature(request.temperature));
        voice_attrs.push(("parameters", parameters.as_str()));
    }
    ssml.open("voice", &voice_attrs);

    match request.prosody_rate.as_deref() {
        Some(rate) if !rate.is_empty() => {
            ssml.open("prosody", &[("rate", rate)]);
            ssml.text(&text);
            ssml.close("prosody");
        }
        _ => ssml.text(&text),
    }

    ssml.close("voice");
    ssml.close("speak");
    ssml.finish()
}

/// Render a temperature the way Python's `repr(float)` writes it, since the
/// voice configuration is shared with Python tooling: shortest round-trip
/// digits, `.0` on integral values, scientific notation below 1e-4 or from
/// 1e16 up with a signed two-digit exponent, `nan`/`inf` lowercase.
fn format_temperature(temperature: f64) -> String {
    if temperature.is_nan() {
        return "nan".into();
    }
    if temperature.is_infinite() {
        return if temperature > 0.0 { "inf" } else { "-inf" }.into();
    }

    let scientific = format!("{temperature:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .and_then(|(m, e)| e.parse::<i32>().ok().map(|e| (m, e)))
        .unwrap_or((scientific.as_str(), 0));

    if temperature != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else if temperature.fract() == 0.0 {
        format!("{temperature:.1}")
    } else {
        temperature.to_string()
    }
}

/// Minimal element writer. Attribute values are written as given, inside
/// single quotes; text must already be escaped.
#[derive(Default)]
struct SsmlWriter {
    out: String,
}

impl SsmlWriter {
    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            let _ = write!(self.out, " {name}='{value}'");
        }
        self.out.push('>');
    }

    fn text(&mut self, escaped: &str) {
        self.out.push_str(escaped);
    }

    fn close(&mut self, tag: &str) {
        let _ = write!(self.out, "</{tag}>");
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape_xml(text: &str) -> String {
        text.replace("&apos;", "'")
            .replace("&quot;", "\"")
            .replace("&gt;", ">")
            .replace("&lt;", "<")
            .replace("&amp;", "&")
    }

    fn voices() -> VoiceTable {
        VoiceTable::new(HashMap::from([(
            "Xiaoxiao".to_string(),
            "zh-CN-Xiaoxiao:DragonHDLatestNeural".to_string(),
        )]))
    }

    #[test]
    fn escape_removes_raw_special_characters() {
        let samples = [
            "Hello & <world>",
            r#"She said "it's fine" & left"#,
            "&amp; already looks escaped",
            "<<>>''\"\"&&",
            "没有特殊字符",
        ];
        for original in samples {
            let escaped = escape_xml(original);
            let stripped = escaped
                .replace("&amp;", "")
                .replace("&lt;", "")
                .replace("&gt;", "")
                .replace("&quot;", "")
                .replace("&apos;", "");
            assert!(
                !stripped.contains(['&', '<', '>', '"', '\'']),
                "raw special character left in {escaped:?}"
            );
            assert_eq!(unescape_xml(&escaped), original);
        }
    }

    #[test]
    fn ampersand_is_escaped_once() {
        assert_eq!(escape_xml("<&>"), "&lt;&amp;&gt;");
        assert_eq!(escape_xml("&lt;"), "&amp;lt;");
    }

    #[test]
    fn unknown_speaker_uses_default_voice() {
        let request = SynthesisRequest::new("你好", "Nobody");
        let ssml = build_ssml(&request, &voices());
        assert!(ssml.contains("<voice name='zh-CN-YunxiNeural'>"));
    }

    #[test]
    fn known_speaker_uses_table_voice() {
        let request = SynthesisRequest::new("你好", "Xiaoxiao");
        let ssml = build_ssml(&request, &voices());
        assert!(ssml.contains("<voice name='zh-CN-Xiaoxiao:DragonHDLatestNeural'>"));
    }

    #[test]
    fn default_temperature_has_no_parameters_attribute() {
        let request = SynthesisRequest::new("hi", "Xiaoxiao").with_temperature(1.0);
        let ssml = build_ssml(&request, &voices());
        assert!(!ssml.contains("parameters="));
    }

    #[test]
    fn non_default_temperature_is_serialized() {
        let request = SynthesisRequest::new("hi", "Xiaoxiao").with_temperature(0.7);
        let ssml = build_ssml(&request, &voices());
        assert!(ssml.contains(
            "<voice name='zh-CN-Xiaoxiao:DragonHDLatestNeural' parameters='temperature=0.7'>"
        ));

        let request = SynthesisRequest::new("hi", "Xiaoxiao").with_temperature(2.0);
        assert!(build_ssml(&request, &voices()).contains("parameters='temperature=2.0'"));
    }

    #[test]
    fn temperature_follows_python_float_repr() {
        let cases = [
            (0.7, "0.7"),
            (2.0, "2.0"),
            (-0.0, "-0.0"),
            (0.0001, "0.0001"),
            (1e-5, "1e-05"),
            (1.5e-7, "1.5e-07"),
            (1e15, "1000000000000000.0"),
            (1e16, "1e+16"),
            (1e20, "1e+20"),
            (-2.5e100, "-2.5e+100"),
            (f64::NAN, "nan"),
            (f64::INFINITY, "inf"),
            (f64::NEG_INFINITY, "-inf"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_temperature(value), expected, "temperature {value}");
        }

        let request = SynthesisRequest::new("hi", "Xiaoxiao").with_temperature(1e-5);
        assert!(build_ssml(&request, &voices()).contains("parameters='temperature=1e-05'"));
    }

    #[test]
    fn prosody_rate_wraps_text() {
        let request =
            SynthesisRequest::new("hi", "Xiaoxiao").with_prosody_rate(Some("-10%".into()));
        let ssml = build_ssml(&request, &voices());
        assert!(ssml.contains("<prosody rate='-10%'>hi</prosody>"));
    }

    #[test]
    fn missing_or_empty_prosody_rate_leaves_bare_text() {
        for rate in [None, Some(String::new())] {
            let request = SynthesisRequest::new("hi", "Xiaoxiao").with_prosody_rate(rate);
            let ssml = build_ssml(&request, &voices());
            assert!(!ssml.contains("<prosody"));
            assert!(ssml.contains("DragonHDLatestNeural'>hi</voice>"));
        }
    }

    #[test]
    fn full_document_layout() {
        let request = SynthesisRequest::new("Hello & <world>", "Yunxi")
            .with_prosody_rate(Some("-10%".into()))
            .with_temperature(1.0);
        let ssml = build_ssml(&request, &VoiceTable::default());
        assert_eq!(
            ssml,
            "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' \
             xmlns:mstts='https://www.w3.org/2001/mstts' xml:lang='zh-CN'>\
             <voice name='zh-CN-YunxiNeural'>\
             <prosody rate='-10%'>Hello &amp; &lt;world&gt;</prosody>\
             </voice></speak>"
        );
    }
}
