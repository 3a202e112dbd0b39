use crate::geometry::{BoundingBox, Position};
use crate::zones::Zone;

/// First zone in iteration order whose box strictly overlaps `avatar`.
pub fn detect<'a, I>(avatar: BoundingBox, zones: I) -> Option<&'a Zone>
where
    I: IntoIterator<Item = &'a Zone>,
{
    zones
        .into_iter()
        .find(|zone| zone.bounds().overlaps(&avatar))
}

/// First zone in iteration order containing `point`; used for pointer hit tests.
pub fn zone_at_point<'a, I>(point: Position, zones: I) -> Option<&'a Zone>
where
    I: IntoIterator<Item = &'a Zone>,
{
    zones.into_iter().find(|zone| zone.bounds().contains(point))
}
