use super::*;

fn cats(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("c{i}")).collect()
}

#[test]
fn test_default_palette_sizes() {
    assert_eq!(default_palette(3), expand(&DEFAULT_20[..3]));
    assert_eq!(default_palette(20).len(), 20);
    assert_eq!(default_palette(21)[0], Rgba::opaque(DEFAULT_28[0]));
    let generated = default_palette(60);
    assert_eq!(generated.len(), 60);
    assert_eq!(generated, default_palette(60));
    assert_eq!(default_palette(103), vec![Rgba::GREY; 103]);
}

#[test]
fn test_named_palettes() {
    assert_eq!(named_palette("default_20").unwrap().len(), 20);
    assert_eq!(named_palette("Zeileis_28").unwrap().len(), 28);
    assert!(named_palette("rainbow").is_none());
}

#[test]
fn test_palette_spec_parse() {
    assert_eq!(
        PaletteSpec::parse("default_28"),
        Ok(PaletteSpec::Named("default_28".to_string()))
    );
    assert_eq!(
        PaletteSpec::parse("red"),
        Ok(PaletteSpec::Colors(vec![Rgba::opaque(0xff0000)]))
    );
    assert_eq!(
        PaletteSpec::parse("red, #0000ff"),
        Ok(PaletteSpec::Colors(vec![
            Rgba::opaque(0xff0000),
            Rgba::opaque(0x0000ff)
        ]))
    );
    assert!(PaletteSpec::parse("red,notacolour").is_err());
}

#[test]
fn test_resolve_defaults_and_caches() {
    let mut store = PaletteStore::new();
    let palette = store.resolve("louvain", &cats(3), None);
    assert_eq!(palette.len(), 3);
    assert_eq!(palette.get("c1"), Some(Rgba::opaque(DEFAULT_20[1])));
    assert_eq!(store.get("louvain").unwrap().len(), 3);
}

#[test]
fn test_cached_palette_reused() {
    let mut store = PaletteStore::new();
    let cached = vec![Rgba::BLACK, Rgba::WHITE, Rgba::GREY];
    store.insert("k", cached.clone());
    let palette = store.resolve("k", &cats(2), None);
    assert_eq!(palette.color_at(0), Some(Rgba::BLACK));
    assert_eq!(palette.color_at(1), Some(Rgba::WHITE));
    assert_eq!(store.get("k").unwrap(), cached.as_slice());
}

#[test]
fn test_short_cache_extended_without_duplicates() {
    let mut store = PaletteStore::new();
    let first = Rgba::opaque(DEFAULT_20[1]);
    store.insert("k", vec![first]);
    let palette = store.resolve("k", &cats(3), None);
    let colors: Vec<Rgba> = palette.iter().map(|(_, c)| c).collect();
    assert_eq!(
        colors,
        vec![first, Rgba::opaque(DEFAULT_20[0]), Rgba::opaque(DEFAULT_20[2])]
    );
    assert_eq!(store.get("k").unwrap().len(), 3);
}

#[test]
fn test_user_palette_cycled() {
    let mut store = PaletteStore::new();
    store.insert("k", default_palette(5));
    let user = [Rgba::BLACK, Rgba::WHITE];
    let palette = store.resolve("k", &cats(5), Some(&user));
    let colors: Vec<Rgba> = palette.iter().map(|(_, c)| c).collect();
    assert_eq!(
        colors,
        vec![Rgba::BLACK, Rgba::WHITE, Rgba::BLACK, Rgba::WHITE, Rgba::BLACK]
    );
    assert_eq!(store.get("k").unwrap()[0], Rgba::BLACK);
}

#[test]
fn test_no_categories() {
    let mut store = PaletteStore::new();
    assert!(store.resolve("k", &[], None).is_empty());
    assert!(store.is_empty());
}
