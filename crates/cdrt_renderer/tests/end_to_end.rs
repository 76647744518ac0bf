//! Whole-pipeline checks: scene build, camera rays, integrator, renderer.

use cdrt_math::EPSILON;
use cdrt_renderer::{
    Camera, CancelToken, Color, ConvolutionIntegrator, Integrator, Interval, Lambertian, Light,
    Plane, RenderSettings, Renderer, Scene, SceneBuilder, Sphere, Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn white_sphere_scene(settings: &RenderSettings) -> Scene {
    let mut builder = SceneBuilder::new();
    let white = builder.add_material(Lambertian::new(Color::ONE));
    builder.add(Sphere::new(Vec3::ZERO, 0.5, white));
    builder.set_light(Light::point(Vec3::new(0.0, 0.0, -2.0), Color::ONE));
    builder.build(&settings.bvh).unwrap()
}

fn camera(settings: &RenderSettings) -> Camera {
    Camera::new(45.0, settings.aspect_ratio()).with_position(
        Vec3::new(0.0, 0.0, -2.0),
        Vec3::ZERO,
        Vec3::Y,
    )
}

#[test]
fn centre_pixel_hits_white_sphere() {
    let settings = RenderSettings {
        width: 33,
        height: 25,
        samples: 1,
        ..Default::default()
    };
    let scene = white_sphere_scene(&settings);
    let camera = camera(&settings);

    // One sample per pixel sits at the pixel centre
    let (dx, dy) = settings.sample_position(0);
    let u = (16.0 + dx) / settings.width as f32;
    let v = (12.0 + dy) / settings.height as f32;
    let ray = camera.get_ray(u, v);

    let rec = scene.hit(&ray, Interval::new(EPSILON, f32::INFINITY)).unwrap();
    assert!((rec.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-3);
    assert!(rec.front_face);

    let integrator = ConvolutionIntegrator::new(settings.convolution);
    let mut rng = StdRng::seed_from_u64(0);
    let color = integrator.radiance(&ray, &scene, &mut rng);
    assert!(color.min_element() > 0.0);
}

#[test]
fn ray_aimed_away_is_black() {
    let settings = RenderSettings::default();
    let scene = white_sphere_scene(&settings);
    let integrator = ConvolutionIntegrator::new(settings.convolution);
    let mut rng = StdRng::seed_from_u64(0);

    let away = cdrt_renderer::Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(integrator.radiance(&away, &scene, &mut rng), Color::ZERO);
}

#[test]
fn full_render_of_white_sphere() {
    let settings = RenderSettings {
        width: 40,
        height: 30,
        samples: 4,
        bucket_size: 16,
        ..Default::default()
    };
    let scene = white_sphere_scene(&settings);
    let renderer = Renderer::new(scene, camera(&settings), settings).unwrap();

    let stats = renderer.render(&CancelToken::new()).unwrap();
    assert_eq!(stats.buckets, 3 * 2);

    let image = renderer.last_render().unwrap();
    assert_eq!(image.len(), 40 * 30 * 3);

    let pixel = |x: usize, y: usize| &image[(y * 40 + x) * 3..(y * 40 + x) * 3 + 3];
    assert!(pixel(20, 15).iter().all(|&c| c > 0.5));
    assert!(pixel(0, 0).iter().all(|&c| c == 0.0));
    assert!(pixel(39, 29).iter().all(|&c| c == 0.0));
}

#[test]
fn sphere_casts_occlusion_on_floor() {
    // Light straight above a sphere resting over a floor patch
    let mut builder = SceneBuilder::new();
    let white = builder.add_material(Lambertian::new(Color::ONE));
    let ball = builder.add(Sphere::new(Vec3::new(0.0, 0.3, 0.0), 0.2, white));
    builder.add(Plane::new(Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 0.0, -1.0), 2.0, 2.0, white));
    builder.set_light(Light::point(Vec3::new(0.0, 2.0, 0.0), Color::ONE));
    let scene = builder.build(&Default::default()).unwrap();
    let integrator = ConvolutionIntegrator::default();

    let down = |x: f32| cdrt_renderer::Ray::new(Vec3::new(x, 5.0, 0.01), -Vec3::Y);
    // Probe the floor from beneath so the ball never gets in the way
    let floor_hit = |x: f32| {
        let ray = cdrt_renderer::Ray::new(Vec3::new(x, -1.0, 0.01), Vec3::Y);
        scene.hit(&ray, Interval::new(EPSILON, f32::INFINITY)).unwrap()
    };

    // Seen from above, the centre shows the ball
    let rec = scene
        .hit(&down(0.0), Interval::new(EPSILON, f32::INFINITY))
        .unwrap();
    assert_eq!(rec.object, Some(ball));

    // Floor point under the ball sees the ball between itself and the light
    let (_, rn_under) = integrator.terms(&floor_hit(0.0), &scene);
    let (_, rn_open) = integrator.terms(&floor_hit(0.8), &scene);
    assert!(rn_under > 0.3);
    assert_eq!(rn_open, 0.0);
}
