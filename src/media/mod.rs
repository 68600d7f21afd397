//! Media descriptors
//!
//! Codec vocabulary used to describe what a stream carries.

pub mod codec;

pub use codec::{
    AacObjectType, AudioChannels, AudioCodecId, AudioInfo, AudioSampleRate, AvcLevel, AvcProfile,
    VideoCodecId, VideoInfo,
};
