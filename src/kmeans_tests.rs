#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::random::SequenceSource;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn buffer_of(colors: &[(u8, u8, u8)]) -> PixelBuffer {
        let colors: Vec<Color> = colors.iter().map(|&(r, g, b)| Color::new(r, g, b)).collect();
        PixelBuffer::from_colors(&colors)
    }

    fn create_gradient_buffer(width: u32, height: u32) -> PixelBuffer {
        let mut colors = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                colors.push(Color::new(r, g, 128));
            }
        }
        PixelBuffer::from_colors(&colors)
    }

    #[test]
    fn test_single_cluster_is_the_mean() {
        let buffer = buffer_of(&[(10, 20, 30), (20, 40, 60), (30, 60, 90), (40, 80, 120)]);
        let mut rng = StdRng::seed_from_u64(7);
        let result = cluster(&buffer, 1, &KMeansOptions::default(), &mut rng).unwrap();

        assert_eq!(result.palette, vec![Color::new(25, 50, 75)]);
        assert_eq!(result.assignment, vec![0, 0, 0, 0]);
        assert!(result.converged);
    }

    #[test]
    fn test_four_distinct_colors_four_clusters() {
        let buffer = buffer_of(&[(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 255)]);
        let mut source = SequenceSource::new(vec![0, 1, 2, 3]);
        let result = cluster(&buffer, 4, &KMeansOptions::default(), &mut source).unwrap();

        assert_eq!(
            result.palette,
            vec![
                Color::new(255, 0, 0),
                Color::new(0, 255, 0),
                Color::new(0, 0, 255),
                Color::new(255, 255, 255),
            ]
        );
        assert_eq!(result.assignment, vec![0, 1, 2, 3]);
        assert_eq!(result.iterations, 1);
        assert!(result.converged);
    }

    #[test]
    fn test_output_sizes_match_k_and_pixel_count() {
        let buffer = create_gradient_buffer(20, 15);
        for k in [1, 2, 5, 16] {
            let mut rng = StdRng::seed_from_u64(k as u64);
            let result = cluster(&buffer, k, &KMeansOptions::default(), &mut rng).unwrap();
            assert_eq!(result.palette.len(), k);
            assert_eq!(result.assignment.len(), buffer.pixel_count());
            assert!(result.assignment.iter().all(|&c| c < k));
        }
    }

    #[test]
    fn test_empty_cluster_is_reseeded() {
        // Both initial centroids are black, so cluster 1 starts empty and is
        // reseeded with the third scripted draw (white).
        let buffer = buffer_of(&[(0, 0, 0), (0, 0, 0), (255, 255, 255), (255, 255, 255)]);
        let mut source = SequenceSource::new(vec![0, 0, 2]);
        let result = cluster(&buffer, 2, &KMeansOptions::default(), &mut source).unwrap();

        assert_eq!(result.palette, vec![Color::new(0, 0, 0), Color::new(255, 255, 255)]);
        assert_eq!(result.assignment, vec![0, 0, 1, 1]);
        assert_eq!(source.draws(), 3);
        assert!(result.converged);
    }

    #[test]
    fn test_terminates_when_k_close_to_pixel_count() {
        // Only two distinct colors for sixteen clusters: most clusters stay
        // empty and get reseeded every pass.
        let mut colors = vec![(0, 0, 0); 9];
        colors.extend(vec![(200, 100, 50); 9]);
        let buffer = buffer_of(&colors);
        let options = KMeansOptions::default();
        let mut rng = StdRng::seed_from_u64(99);

        let result = cluster(&buffer, 16, &options, &mut rng).unwrap();
        assert!(result.iterations <= options.max_iterations);
        assert_eq!(result.palette.len(), 16);
        assert_eq!(result.assignment.len(), 18);
    }

    #[test]
    fn test_iteration_cap_is_honored() {
        let buffer = create_gradient_buffer(8, 8);
        let options = KMeansOptions {
            max_iterations: 3,
            epsilon: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let result = cluster(&buffer, 4, &options, &mut rng).unwrap();
        assert_eq!(result.iterations, 3);
        assert!(!result.converged);
    }

    #[test]
    fn test_variance_delta_stability() {
        let buffer = buffer_of(&[(0, 0, 0), (0, 0, 0), (255, 255, 255), (255, 255, 255)]);
        let options = KMeansOptions {
            stability: Stability::VarianceDelta,
            ..Default::default()
        };
        let mut source = SequenceSource::new(vec![0, 2]);
        let result = cluster(&buffer, 2, &options, &mut source).unwrap();

        assert_eq!(result.palette, vec![Color::new(0, 0, 0), Color::new(255, 255, 255)]);
        // The first pass compares against the initial variance of 1.0.
        assert_eq!(result.iterations, 2);
        assert!(result.converged);
    }

    #[test]
    fn test_same_seed_same_result() {
        let buffer = create_gradient_buffer(16, 16);
        let options = KMeansOptions::default();
        let a = cluster(&buffer, 6, &options, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = cluster(&buffer, 6, &options, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_inputs() {
        let buffer = buffer_of(&[(1, 2, 3)]);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            cluster(&buffer, 0, &KMeansOptions::default(), &mut rng),
            Err(QuantizeError::InvalidConfig(_))
        ));
        assert_eq!(
            cluster(&PixelBuffer::default(), 2, &KMeansOptions::default(), &mut rng),
            Err(QuantizeError::EmptyBuffer)
        );

        let no_iterations = KMeansOptions {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            cluster(&buffer, 1, &no_iterations, &mut rng),
            Err(QuantizeError::InvalidConfig(_))
        ));

        let bad_epsilon = KMeansOptions {
            epsilon: f64::NAN,
            ..Default::default()
        };
        assert!(bad_epsilon.validate().is_err());
    }

    #[test]
    fn test_k_above_pixel_count_is_rejected_before_allocating() {
        let buffer = buffer_of(&[(1, 2, 3), (4, 5, 6)]);
        let mut source = SequenceSource::new(vec![0]);

        for k in [3, usize::MAX] {
            assert!(matches!(
                cluster(&buffer, k, &KMeansOptions::default(), &mut source),
                Err(QuantizeError::InvalidConfig(_))
            ));
        }
        assert_eq!(source.draws(), 0);

        // k equal to the pixel count is still allowed
        assert!(cluster(&buffer, 2, &KMeansOptions::default(), &mut source).is_ok());
    }

    #[test]
    fn test_cluster_arena_groups_members() {
        let mut arena = ClusterArena::new(3, 4);
        arena.rebuild(&[1, 0, 1, 2]);
        assert_eq!(arena.members(0), &[1]);
        assert_eq!(arena.members(1), &[0, 2]);
        assert_eq!(arena.members(2), &[3]);

        arena.rebuild(&[2, 2, 2, 2]);
        assert!(arena.members(0).is_empty());
        assert!(arena.members(1).is_empty());
        assert_eq!(arena.members(2), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_mean_color_rounds() {
        let colors = [Color::new(0, 0, 0), Color::new(255, 1, 2)];
        assert_eq!(mean_color(colors.iter(), 2), Color::new(128, 1, 1));
    }
}
