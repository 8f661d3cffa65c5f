use serde::{Deserialize, Serialize};

use crate::rendering::domain::annotation_style::{AnnotationStyle, Color};

/// Skeleton edges for the 21-point hand model.
pub const HAND_CONNECTIONS: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Skeleton edges for the 33-point body model.
pub const POSE_CONNECTIONS: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

/// The landmark schemas a detector can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetectorKind {
    Face,
    FaceMesh,
    Hand,
    Pose,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 4] = [Self::Face, Self::FaceMesh, Self::Hand, Self::Pose];

    /// Points per subject. Face detection yields six keypoints (eyes, nose
    /// tip, mouth, ear tragions).
    pub fn landmark_count(self) -> usize {
        match self {
            Self::Face => 6,
            Self::FaceMesh => 468,
            Self::Hand => 21,
            Self::Pose => 33,
        }
    }

    /// Edges drawn between landmarks. Face kinds are drawn as points only.
    pub fn connections(self) -> &'static [(usize, usize)] {
        match self {
            Self::Face | Self::FaceMesh => &[],
            Self::Hand => HAND_CONNECTIONS,
            Self::Pose => POSE_CONNECTIONS,
        }
    }

    /// Output directory name under the output root.
    pub fn category(self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::FaceMesh => "faceMesh",
            Self::Hand => "hands",
            Self::Pose => "pose",
        }
    }

    pub fn default_max_subjects(self) -> usize {
        match self {
            Self::Face => 10,
            Self::FaceMesh => 3,
            Self::Hand => 2,
            Self::Pose => 1,
        }
    }

    pub fn default_style(self) -> AnnotationStyle {
        let green = Color(0, 246, 26);
        match self {
            Self::Face => {
                let teal = Color(24, 155, 157);
                AnnotationStyle::new()
                    .with_colors(teal, teal)
                    .with_text_color(teal)
            }
            Self::FaceMesh => AnnotationStyle::new()
                .with_colors(green, green)
                .with_sizes(1, 1),
            Self::Hand => AnnotationStyle::new()
                .with_colors(Color(255, 0, 0), green)
                .with_sizes(4, 2),
            Self::Pose => AnnotationStyle::new(),
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.category())
    }
}
