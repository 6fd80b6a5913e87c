//! Geographic computations for the deadline meridian.
//!
//! - **angles**: longitude wrapping, minute-of-day differences, meridian distance
//! - **solar**: sub-solar point, meridian longitude, terminator and night polygon
//! - **crossing**: when the meridian passes over fixed landmarks
//! - **polygons**: timezone polygon dataset normalisation

pub mod angles;
pub mod crossing;
pub mod polygons;
pub mod solar;

pub use angles::{LonLatPoint, MeridianDistance, meridian_distance, wrap180};
pub use crossing::{Landmark, LandmarkCrossing, find_crossings, load_landmarks};
pub use polygons::{PolygonGeometry, TimezonePolygonFeature, load_feature_collection};
pub use solar::{
    is_night, line_speed_degrees_per_hour, meridian_longitude_for_target, night_polygon,
    subsolar_point, terminator_polyline,
};
