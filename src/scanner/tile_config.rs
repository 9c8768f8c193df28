use super::Candidate;
use crate::address;
use crate::size::Dimension;
use crate::text::{TextCursor, parse_attributes};
use url::Url;

const TILES: [(&str, Dimension); 4] = [
    ("<square70x70logo", Dimension::square(70)),
    ("<square150x150logo", Dimension::square(150)),
    ("<wide310x150logo", Dimension::new(310, 150)),
    ("<square310x310logo", Dimension::square(310)),
];

/// Finds the tile images declared in a `browserconfig.xml`:
///
/// ```xml
/// <browserconfig><msapplication><tile>
///   <square150x150logo src="/mstile-150x150.png"/>
/// </tile></msapplication></browserconfig>
/// ```
///
/// Images are resolved against the config's own address. Broken documents yield whatever could
/// be read before the damage.
pub fn parse_tile_config(target: &Url, text: &str) -> Vec<Candidate> {
    let mut cursor = TextCursor::new(text);
    let mut candidates = vec![];

    if !cursor.skip_until("<tile") {
        return candidates;
    }

    let needles = TILES.map(|(needle, _)| needle);
    while let Some(found) = cursor.skip_until_any(&needles) {
        let attributes = parse_attributes(&mut cursor);
        let Some(src) = attributes.get("src") else {
            continue;
        };
        let Some(&(_, expected_size)) = TILES.iter().find(|(needle, _)| *needle == found) else {
            continue;
        };

        match address::resolve(target, src) {
            Ok(location) => candidates.push(Candidate {
                location,
                expected_size,
            }),
            Err(_e) => {
                #[cfg(feature = "log")]
                log::debug!("dropping tile image: {_e}");
            }
        }
    }

    candidates
}
