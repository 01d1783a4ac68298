use ffmpeg_next::codec::Id;

/// Maps a four-character code to the ffmpeg codec that implements it.
///
/// Matching is case-insensitive. Unknown codes return `None`; callers may
/// then try the string as an ffmpeg encoder name.
pub fn codec_id_for_fourcc(fourcc: &str) -> Option<Id> {
    let id = match fourcc.to_ascii_uppercase().as_str() {
        "MJPG" => Id::MJPEG,
        "MP4V" | "FMP4" | "XVID" | "DIVX" | "DX50" => Id::MPEG4,
        "AVC1" | "H264" | "X264" => Id::H264,
        "HVC1" | "HEV1" | "HEVC" | "H265" => Id::HEVC,
        "FFV1" => Id::FFV1,
        "HFYU" => Id::HUFFYUV,
        "MPNG" | "PNG " => Id::PNG,
        "VP80" | "VP08" => Id::VP8,
        "VP90" | "VP09" => Id::VP9,
        _ => return None,
    };
    Some(id)
}

/// Canonical four-character code for streams whose container carries no tag.
pub fn fourcc_for_codec_id(id: Id) -> Option<&'static str> {
    let code = match id {
        Id::MJPEG => "MJPG",
        Id::MPEG4 => "FMP4",
        Id::H264 => "avc1",
        Id::HEVC => "hvc1",
        Id::FFV1 => "FFV1",
        Id::HUFFYUV => "HFYU",
        Id::PNG => "MPNG",
        Id::VP8 => "VP80",
        Id::VP9 => "VP90",
        _ => return None,
    };
    Some(code)
}

/// Resolves an encoder from a four-character code or an ffmpeg encoder name.
pub fn find_encoder(codec: &str) -> Option<ffmpeg_next::Codec> {
    match codec_id_for_fourcc(codec) {
        Some(id) => ffmpeg_next::encoder::find(id),
        None => ffmpeg_next::encoder::find_by_name(codec),
    }
}
