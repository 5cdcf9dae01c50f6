//! Population of learning cars and the generational loop.
//!
//! Each generation seeds every car from the retained best network: one elite
//! car gets an exact copy, the rest get mutated copies. The car that has
//! travelled furthest up the road (smallest y) is the current best; the
//! controller decides when to commit it as the seed for the next generation.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::brain::NeuralNetwork;
use super::car::{Car, Footprint, Pilot, Pose, check_network};
use super::controls::{ControlSource, Controls};
use super::error::SimulationError;
use super::params::Params;
use super::road::Road;
use super::sensor::Sensor;
use super::snapshot::{CarSnapshot, WorldSnapshot};
use super::storage::{NetworkStore, StorageError};

/// The learning cars, the traffic they drive through, and the seed network.
#[derive(Debug, Clone)]
pub struct Population {
    params: Params,
    road: Road,
    /// Learning cars, updated in this order every tick.
    cars: Vec<Car>,
    /// Non-learning obstacles.
    traffic: Vec<Car>,
    /// Id of the first traffic car; traffic ids are contiguous.
    traffic_base: usize,
    /// Network every generation is seeded from.
    seed: Option<NeuralNetwork>,
    best: Option<usize>,
    generation: u32,
    tick: u64,
    next_id: usize,
}

impl Population {
    /// Creates the road, the traffic and the first generation.
    pub fn new(params: Params) -> Result<Self, SimulationError> {
        params.validate()?;
        let road = road_for(&params)?;
        let traffic = build_traffic(&params, &road, 0)?;
        let next_id = traffic.len();

        let mut population = Self {
            params,
            road,
            cars: Vec::new(),
            traffic,
            traffic_base: 0,
            seed: None,
            best: None,
            generation: 0,
            tick: 0,
            next_id,
        };
        population.next_generation()?;
        Ok(population)
    }

    /// Wraps caller-built cars instead of generating them.
    ///
    /// Traffic is still built from `params`, with ids after the largest car id.
    pub fn from_cars(params: Params, cars: Vec<Car>) -> Result<Self, SimulationError> {
        params.validate()?;
        let mut ids: Vec<usize> = cars.iter().map(Car::id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(SimulationError::config("car ids must be unique"));
        }

        let road = road_for(&params)?;
        let traffic_base = ids.last().map_or(0, |&id| id + 1);
        let traffic = build_traffic(&params, &road, traffic_base)?;
        let next_id = traffic_base + traffic.len();
        let best = best_index(&cars);

        Ok(Self {
            params,
            road,
            cars,
            traffic,
            traffic_base,
            seed: None,
            best,
            generation: 1,
            tick: 0,
            next_id,
        })
    }

    /// Starting pose from the configured lane and y.
    pub fn start_pose(&self) -> Pose {
        Pose::new(
            self.road.lane_center(self.params.start.lane),
            self.params.start.y,
        )
    }

    /// Replaces the cars with a new generation.
    ///
    /// Without a seed every car gets a fresh random network. With one, car 0
    /// gets an exact copy and every other car a copy mutated by the
    /// configured rate. Traffic returns to its starting layout, keeping its ids.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of cars
    /// * `start` - Pose shared by every car
    /// * `source` - Who drives the new cars
    pub fn generate(
        &mut self,
        size: usize,
        start: Pose,
        source: ControlSource,
    ) -> Result<(), SimulationError> {
        if size == 0 {
            return Err(SimulationError::config("population_size must be positive"));
        }

        let sensor = sensor_for(&self.params)?;
        let neuron_counts = self.params.neuron_counts();
        let rate = self.params.mutation_rate;
        let body = &self.params.body;
        let seed = self.seed.as_ref();
        let first_id = self.next_id;

        let cars = (0..size)
            .into_par_iter()
            .map(|i| {
                let brain = match seed {
                    Some(best) if i == 0 => best.clone(),
                    Some(best) => best.mutated(rate),
                    None => NeuralNetwork::new(&neuron_counts)?,
                };
                let pilot = Pilot::sensing(sensor.clone(), brain)?;
                Car::new(first_id + i, start, body, source, pilot)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.traffic = build_traffic(&self.params, &self.road, self.traffic_base)?;
        self.cars = cars;
        self.next_id += size;
        self.generation += 1;
        self.tick = 0;
        self.best = best_index(&self.cars);

        info!(
            generation = self.generation,
            size,
            seeded = self.seed.is_some(),
            "generated population"
        );
        Ok(())
    }

    /// Generates with the configured size, start pose and control source.
    pub fn next_generation(&mut self) -> Result<(), SimulationError> {
        let start = self.start_pose();
        self.generate(
            self.params.population_size,
            start,
            self.params.control_source,
        )
    }

    /// Advances the simulation by one tick.
    ///
    /// Traffic moves first with no obstacles. Each learning car then moves
    /// against the traffic and every learning car already updated this tick,
    /// so collisions depend on array order (unless `population_collisions` is
    /// off). Finally the best car is reselected.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        let borders = &self.road.borders;

        for car in &mut self.traffic {
            car.update(borders, &[])?;
        }

        let mut obstacles: Vec<Footprint> = self.traffic.iter().map(Car::footprint).collect();
        obstacles.reserve(self.cars.len());

        for car in &mut self.cars {
            let was_damaged = car.is_damaged();
            car.update(borders, &obstacles)?;
            if !was_damaged && car.is_damaged() {
                debug!(car = car.id(), tick = self.tick, "car damaged");
            }
            if self.params.population_collisions {
                obstacles.push(car.footprint());
            }
        }

        self.tick += 1;
        self.best = best_index(&self.cars);
        Ok(())
    }

    /// Retains the current best car's network as the seed.
    ///
    /// Returns `false` if there is no best car or it has no network.
    pub fn commit_best(&mut self) -> bool {
        let Some(brain) = self.best().and_then(Car::brain).cloned() else {
            return false;
        };

        info!(
            generation = self.generation,
            best_y = self.best().map(|car| car.position().y),
            "committed best network"
        );
        self.seed = Some(brain);
        true
    }

    /// Forgets the seed; the next generation starts from random networks.
    pub fn clear_seed(&mut self) {
        if self.seed.take().is_some() {
            info!("cleared seed network");
        }
    }

    /// Installs an externally loaded network as the seed.
    ///
    /// # Errors
    ///
    /// [`SimulationError::IncompatibleNetwork`] if the network does not fit the
    /// configured sensor. The seed is then cleared so the next generation
    /// falls back to random networks.
    pub fn restore_seed(&mut self, network: NeuralNetwork) -> Result<(), SimulationError> {
        if let Err(err) = check_network(&network, self.params.sensor.ray_count) {
            warn!(error = %err, "rejected seed network, falling back to random networks");
            self.seed = None;
            return Err(err);
        }
        self.seed = Some(network);
        Ok(())
    }

    /// Restores the seed from a store. Returns whether a network was found.
    pub fn load_seed(
        &mut self,
        store: &impl NetworkStore,
        key: &str,
    ) -> Result<bool, StorageError> {
        match store.load(key)? {
            Some(network) => {
                self.restore_seed(network)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Writes the seed to a store. Returns whether there was a seed to write.
    pub fn save_seed(
        &self,
        store: &mut impl NetworkStore,
        key: &str,
    ) -> Result<bool, StorageError> {
        match &self.seed {
            Some(network) => {
                store.save(key, network)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clears the seed here and in the store.
    pub fn discard_seed(
        &mut self,
        store: &mut impl NetworkStore,
        key: &str,
    ) -> Result<(), StorageError> {
        self.clear_seed();
        store.delete(key)
    }

    /// Writes external controls to every externally driven car.
    ///
    /// Returns how many cars accepted them.
    pub fn steer(&mut self, controls: Controls) -> usize {
        self.cars
            .iter_mut()
            .map(|car| car.steer(controls))
            .filter(|&applied| applied)
            .count()
    }

    /// The car that has travelled furthest.
    pub fn best(&self) -> Option<&Car> {
        self.best.map(|i| &self.cars[i])
    }

    /// Index of the best car in [`Population::cars`].
    pub fn best_index(&self) -> Option<usize> {
        self.best
    }

    /// Learning cars in update order.
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Traffic cars.
    pub fn traffic(&self) -> &[Car] {
        &self.traffic
    }

    /// Number of learning cars still driving.
    pub fn alive_count(&self) -> usize {
        self.cars.iter().filter(|car| !car.is_damaged()).count()
    }

    /// Whether every learning car has crashed.
    pub fn all_damaged(&self) -> bool {
        self.cars.iter().all(Car::is_damaged)
    }

    /// The retained seed network.
    pub fn seed(&self) -> Option<&NeuralNetwork> {
        self.seed.as_ref()
    }

    /// Generations produced so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Ticks since the current generation started.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The road.
    pub fn road(&self) -> &Road {
        &self.road
    }

    /// The parameters this population was built from.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A read-only view for renderers.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            generation: self.generation,
            best: self.best,
            borders: self.road.borders.clone(),
            lane_dividers: self.road.lane_dividers(),
            cars: self.cars.iter().map(CarSnapshot::from).collect(),
            traffic: self.traffic.iter().map(CarSnapshot::from).collect(),
        }
    }
}

/// Index of the car with the smallest y, damaged or not; ties go to the first.
pub fn best_index(cars: &[Car]) -> Option<usize> {
    cars.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.position().y.total_cmp(&b.position().y))
        .map(|(i, _)| i)
}

fn road_for(params: &Params) -> Result<Road, SimulationError> {
    Road::new(
        params.road.center_x,
        params.road.width,
        params.road.lane_count,
        params.road.extent,
    )
}

fn sensor_for(params: &Params) -> Result<Sensor, SimulationError> {
    Sensor::new(
        params.sensor.ray_count,
        params.sensor.ray_length,
        params.sensor.ray_spread,
        params.sensor.ray_offset,
    )
}

/// Builds the traffic layout with ids counting up from `first_id`.
fn build_traffic(
    params: &Params,
    road: &Road,
    first_id: usize,
) -> Result<Vec<Car>, SimulationError> {
    params
        .traffic
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let mut body = params.body.clone();
            body.max_speed = slot.max_speed;
            Car::new(
                first_id + i,
                Pose::new(road.lane_center(slot.lane), slot.y),
                &body,
                ControlSource::ConstantForward,
                Pilot::Sensorless,
            )
        })
        .collect()
}
