//! Codec vocabulary
//!
//! Enumerations for the codec attributes reported by media-info events,
//! together with the names the status API renders for them. Values follow
//! the FLV tag header encoding and the H.264/AAC numbering.

/// Video codec id (lower 4 bits of the FLV video tag header)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodecId {
    Reserved = 0,
    SorensonH263 = 2,
    ScreenVideo = 3,
    On2Vp6 = 4,
    On2Vp6WithAlpha = 5,
    ScreenVideoV2 = 6,
    Avc = 7,
    Hevc = 12,
    Av1 = 13,
}

impl VideoCodecId {
    pub fn from_byte(b: u8) -> Self {
        match b {
            2 => VideoCodecId::SorensonH263,
            3 => VideoCodecId::ScreenVideo,
            4 => VideoCodecId::On2Vp6,
            5 => VideoCodecId::On2Vp6WithAlpha,
            6 => VideoCodecId::ScreenVideoV2,
            7 => VideoCodecId::Avc,
            12 => VideoCodecId::Hevc,
            13 => VideoCodecId::Av1,
            _ => VideoCodecId::Reserved,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VideoCodecId::Avc => "H264",
            VideoCodecId::On2Vp6 | VideoCodecId::On2Vp6WithAlpha => "VP6",
            VideoCodecId::Hevc => "HEVC",
            VideoCodecId::Av1 => "AV1",
            _ => "Other",
        }
    }
}

/// H.264 profile_idc, with the constrained/intra variants folded in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvcProfile {
    Reserved = 0,
    Baseline = 66,
    ConstrainedBaseline = 578,
    Main = 77,
    Extended = 88,
    High = 100,
    High10 = 110,
    High10Intra = 2158,
    High422 = 122,
    High422Intra = 2170,
    High444 = 144,
    High444Predictive = 244,
    High444Intra = 2192,
}

impl AvcProfile {
    pub fn from_u16(v: u16) -> Self {
        match v {
            66 => AvcProfile::Baseline,
            578 => AvcProfile::ConstrainedBaseline,
            77 => AvcProfile::Main,
            88 => AvcProfile::Extended,
            100 => AvcProfile::High,
            110 => AvcProfile::High10,
            2158 => AvcProfile::High10Intra,
            122 => AvcProfile::High422,
            2170 => AvcProfile::High422Intra,
            144 => AvcProfile::High444,
            244 => AvcProfile::High444Predictive,
            2192 => AvcProfile::High444Intra,
            _ => AvcProfile::Reserved,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AvcProfile::Baseline => "Baseline",
            AvcProfile::ConstrainedBaseline => "Baseline(Constrained)",
            AvcProfile::Main => "Main",
            AvcProfile::Extended => "Extended",
            AvcProfile::High => "High",
            AvcProfile::High10 => "High(10)",
            AvcProfile::High10Intra => "High(10+Intra)",
            AvcProfile::High422 => "High(422)",
            AvcProfile::High422Intra => "High(422+Intra)",
            AvcProfile::High444 => "High(444)",
            AvcProfile::High444Predictive => "High(444+Predictive)",
            AvcProfile::High444Intra => "High(444+Intra)",
            AvcProfile::Reserved => "Other",
        }
    }
}

/// H.264 level_idc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvcLevel {
    Reserved = 0,
    L1 = 10,
    L11 = 11,
    L12 = 12,
    L13 = 13,
    L2 = 20,
    L21 = 21,
    L22 = 22,
    L3 = 30,
    L31 = 31,
    L32 = 32,
    L4 = 40,
    L41 = 41,
    L5 = 50,
    L51 = 51,
}

impl AvcLevel {
    pub fn from_byte(b: u8) -> Self {
        match b {
            10 => AvcLevel::L1,
            11 => AvcLevel::L11,
            12 => AvcLevel::L12,
            13 => AvcLevel::L13,
            20 => AvcLevel::L2,
            21 => AvcLevel::L21,
            22 => AvcLevel::L22,
            30 => AvcLevel::L3,
            31 => AvcLevel::L31,
            32 => AvcLevel::L32,
            40 => AvcLevel::L4,
            41 => AvcLevel::L41,
            50 => AvcLevel::L5,
            51 => AvcLevel::L51,
            _ => AvcLevel::Reserved,
        }
    }

    /// Level as rendered by the status API ("3.1", "4", ...)
    pub fn name(&self) -> &'static str {
        match self {
            AvcLevel::L1 => "1",
            AvcLevel::L11 => "1.1",
            AvcLevel::L12 => "1.2",
            AvcLevel::L13 => "1.3",
            AvcLevel::L2 => "2",
            AvcLevel::L21 => "2.1",
            AvcLevel::L22 => "2.2",
            AvcLevel::L3 => "3",
            AvcLevel::L31 => "3.1",
            AvcLevel::L32 => "3.2",
            AvcLevel::L4 => "4",
            AvcLevel::L41 => "4.1",
            AvcLevel::L5 => "5",
            AvcLevel::L51 => "5.1",
            AvcLevel::Reserved => "Other",
        }
    }
}

/// Audio codec id (SoundFormat, upper 4 bits of the FLV audio tag header)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodecId {
    LinearPcmPlatformEndian = 0,
    Adpcm = 1,
    Mp3 = 2,
    LinearPcmLittleEndian = 3,
    Nellymoser16kMono = 4,
    Nellymoser8kMono = 5,
    Nellymoser = 6,
    G711ALaw = 7,
    G711MuLaw = 8,
    Reserved = 9,
    Aac = 10,
    Speex = 11,
    Opus = 13,
    Mp3At8k = 14,
    DeviceSpecific = 15,
}

impl AudioCodecId {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => AudioCodecId::LinearPcmPlatformEndian,
            1 => AudioCodecId::Adpcm,
            2 => AudioCodecId::Mp3,
            3 => AudioCodecId::LinearPcmLittleEndian,
            4 => AudioCodecId::Nellymoser16kMono,
            5 => AudioCodecId::Nellymoser8kMono,
            6 => AudioCodecId::Nellymoser,
            7 => AudioCodecId::G711ALaw,
            8 => AudioCodecId::G711MuLaw,
            10 => AudioCodecId::Aac,
            11 => AudioCodecId::Speex,
            13 => AudioCodecId::Opus,
            14 => AudioCodecId::Mp3At8k,
            15 => AudioCodecId::DeviceSpecific,
            _ => AudioCodecId::Reserved,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AudioCodecId::Aac => "AAC",
            AudioCodecId::Mp3 => "MP3",
            AudioCodecId::Opus => "Opus",
            _ => "Other",
        }
    }
}

/// FLV SoundRate index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSampleRate {
    R5512 = 0,
    R11025 = 1,
    R22050 = 2,
    R44100 = 3,
    Reserved = 4,
}

impl AudioSampleRate {
    const FLV_RATES: [u32; 5] = [5512, 11025, 22050, 44100, 0];

    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => AudioSampleRate::R5512,
            1 => AudioSampleRate::R11025,
            2 => AudioSampleRate::R22050,
            3 => AudioSampleRate::R44100,
            _ => AudioSampleRate::Reserved,
        }
    }

    /// Sample rate in Hz, 0 when reserved
    pub fn hz(&self) -> u32 {
        Self::FLV_RATES[*self as usize]
    }
}

/// FLV SoundType
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioChannels {
    Mono = 0,
    Stereo = 1,
}

impl AudioChannels {
    pub fn from_byte(b: u8) -> Self {
        if b & 0x01 == 0 {
            AudioChannels::Mono
        } else {
            AudioChannels::Stereo
        }
    }

    /// Channel count (SoundType is zero-based)
    pub fn count(&self) -> u32 {
        *self as u32 + 1
    }
}

/// AAC audio object type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AacObjectType {
    Reserved = 0,
    Main = 1,
    Lc = 2,
    Ssr = 3,
    He = 5,
    HeV2 = 29,
}

impl AacObjectType {
    pub fn from_byte(b: u8) -> Self {
        match b {
            1 => AacObjectType::Main,
            2 => AacObjectType::Lc,
            3 => AacObjectType::Ssr,
            5 => AacObjectType::He,
            29 => AacObjectType::HeV2,
            _ => AacObjectType::Reserved,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AacObjectType::Main => "Main",
            AacObjectType::Lc => "LC",
            AacObjectType::Ssr => "SSR",
            AacObjectType::He => "HE",
            AacObjectType::HeV2 => "HEv2",
            AacObjectType::Reserved => "Other",
        }
    }
}

/// Video descriptor reported by a video-info event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub codec: VideoCodecId,
    pub profile: AvcProfile,
    pub level: AvcLevel,
    pub width: u32,
    pub height: u32,
}

/// Audio descriptor reported by an audio-info event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub codec: AudioCodecId,
    pub sample_rate: AudioSampleRate,
    pub channels: AudioChannels,
    pub object_type: AacObjectType,
}
