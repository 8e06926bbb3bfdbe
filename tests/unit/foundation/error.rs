use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(HudError::EmptyTrack.to_string().contains("empty track"));
    assert!(
        HudError::malformed("x")
            .to_string()
            .contains("malformed source:")
    );
    assert!(
        HudError::invalid_config("x")
            .to_string()
            .contains("invalid configuration:")
    );
    assert!(HudError::warp("x").to_string().contains("warp error:"));
    assert!(
        HudError::DegenerateSegment { target_s: 12.5 }
            .to_string()
            .contains("t=12.5s")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = HudError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
