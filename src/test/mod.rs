mod entrance_paths;
mod grouped_topologies;
mod record_export;
mod skewed_planning;
mod solvers;
